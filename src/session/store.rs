// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Server-held session registry.
//!
//! Sessions are keyed by an opaque random id carried in a cookie; the
//! access token itself never leaves the server. Entries live for the
//! lifetime of the process; a missing entry simply means the client must
//! sign in again.

use crate::backend::{IdentityClient, StoreClient};
use crate::session::manager::{RetryPolicy, SessionManager};
use dashmap::DashMap;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

const SESSION_ID_LENGTH: usize = 32;

/// Registry of live portal sessions.
pub struct SessionStore {
    identity: IdentityClient,
    store: StoreClient,
    retry: RetryPolicy,
    sessions: DashMap<String, Arc<SessionManager>>,
}

impl SessionStore {
    pub fn new(identity: IdentityClient, store: StoreClient, retry: RetryPolicy) -> Self {
        Self {
            identity,
            store,
            retry,
            sessions: DashMap::new(),
        }
    }

    /// Look up a live session by its cookie id.
    pub fn get(&self, id: &str) -> Option<Arc<SessionManager>> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    /// Create a session and run its initial probe. With `Some(token)` the
    /// token is validated and the profile resolved before this returns.
    pub async fn open(&self, token: Option<String>) -> (String, Arc<SessionManager>) {
        let manager = Arc::new(SessionManager::new(
            self.identity.clone(),
            self.store.clone(),
            self.retry,
        ));
        manager.initialize(token).await;

        let id = new_session_id();
        self.sessions.insert(id.clone(), manager.clone());
        (id, manager)
    }

    /// Drop a session entry.
    pub fn remove(&self, id: &str) {
        self.sessions.remove(id);
    }
}

fn new_session_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}

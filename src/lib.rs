// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! HIE Portal: backend for a regional health-information-exchange admin portal.
//!
//! This crate is glue over a managed backend (identity service + row store):
//! it owns the session/authorization lifecycle, the privileged registration
//! approval workflow, and the portal's data routes. It holds no storage of
//! its own.

pub mod backend;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use backend::{IdentityClient, StoreClient};
use config::Config;
use services::{ApprovalService, StaffService, WelcomeMailer};
use session::{RetryPolicy, SessionStore};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub identity: IdentityClient,
    pub store: StoreClient,
    pub sessions: SessionStore,
    pub approvals: ApprovalService,
    pub staff: StaffService,
}

impl AppState {
    /// Wire up clients and services against the configured backend.
    pub fn new(config: Config, retry: RetryPolicy) -> Self {
        let identity = IdentityClient::new(
            config.backend_url.clone(),
            config.anon_key.clone(),
            config.service_role_key.clone(),
        );
        let store = StoreClient::new(config.backend_url.clone(), config.service_role_key.clone());
        let sessions = SessionStore::new(identity.clone(), store.clone(), retry);
        let approvals = ApprovalService::new(identity.clone(), store.clone(), WelcomeMailer::new());
        let staff = StaffService::new(identity.clone(), store.clone());

        Self {
            config,
            identity,
            store,
            sessions,
            approvals,
            staff,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Per-session authorization state machine.
//!
//! A `SessionManager` owns one portal session: the opaque access token from
//! the identity service, the resolved profile, and the lifecycle phase. All
//! mutation goes through the narrow operation API below; consumers observe
//! transitions through a watch channel.
//!
//! Concurrent operations (a login racing a logout, a stale profile refresh)
//! are serialized with a request-generation counter: every operation bumps
//! the generation up front, and a result is only applied if no newer
//! operation has started since. A superseded result is discarded instead of
//! overwriting fresher state.

use crate::backend::{AuthUserInfo, IdentityClient, StoreClient};
use crate::error::{AppError, Result};
use crate::models::profile::display_name;
use crate::models::UserProfile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// Bounded retry for the profile-after-identity-creation race.
///
/// The backend creates the profile row from a trigger, so it can lag the
/// identity by a few tens of milliseconds right after account creation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(50),
        }
    }
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No session probe has completed yet.
    Initializing,
    Unauthenticated,
    /// A session exists; the profile fetch has not resolved.
    AuthenticatedPendingProfile,
    /// Profile resolved with one of the three valid roles.
    AuthenticatedWithRole,
    /// Profile resolved but the role is unset (pending approval).
    AuthenticatedNoRole,
}

/// Observable session state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub profile: Option<UserProfile>,
}

impl SessionSnapshot {
    fn initializing() -> Self {
        Self {
            phase: SessionPhase::Initializing,
            profile: None,
        }
    }

    fn unauthenticated() -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            profile: None,
        }
    }

    fn pending_profile() -> Self {
        Self {
            phase: SessionPhase::AuthenticatedPendingProfile,
            profile: None,
        }
    }

    fn resolved(profile: UserProfile) -> Self {
        let phase = if profile.role.is_some() {
            SessionPhase::AuthenticatedWithRole
        } else {
            SessionPhase::AuthenticatedNoRole
        };
        Self {
            phase,
            profile: Some(profile),
        }
    }
}

/// The session itself: token, expiry, identity. Never serialized out.
#[derive(Clone)]
struct AuthSession {
    access_token: String,
    #[allow(dead_code)]
    expires_at: Option<DateTime<Utc>>,
    user: AuthUserInfo,
}

struct SessionInner {
    generation: u64,
    session: Option<AuthSession>,
}

/// Single-owner manager for one portal session.
pub struct SessionManager {
    identity: IdentityClient,
    store: StoreClient,
    retry: RetryPolicy,
    inner: Mutex<SessionInner>,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    pub fn new(identity: IdentityClient, store: StoreClient, retry: RetryPolicy) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::initializing());
        Self {
            identity,
            store,
            retry,
            inner: Mutex::new(SessionInner {
                generation: 0,
                session: None,
            }),
            state,
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// The raw access token, for proxying authenticated calls.
    pub fn access_token(&self) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Identity id of the signed-in user, if any.
    pub fn identity_id(&self) -> Option<Uuid> {
        self.inner
            .lock()
            .unwrap()
            .session
            .as_ref()
            .map(|s| s.user.id)
    }

    /// Initial session probe. With no persisted token the session is simply
    /// unauthenticated; with one, the token is validated and the profile
    /// resolved.
    pub async fn initialize(&self, token: Option<String>) {
        let generation = self.begin_operation();

        let Some(token) = token else {
            self.apply(generation, None, SessionSnapshot::unauthenticated());
            return;
        };

        match self.identity.get_user(&token).await {
            Ok(user) => {
                let session = AuthSession {
                    access_token: token,
                    expires_at: None,
                    user: user.clone(),
                };
                if !self.apply(generation, Some(session), SessionSnapshot::pending_profile()) {
                    return;
                }
                let profile = self.resolve_profile(&user).await;
                self.apply_resolved(generation, profile);
            }
            Err(err) => {
                tracing::debug!(error = %err, "Persisted token rejected during session probe");
                self.apply(generation, None, SessionSnapshot::unauthenticated());
            }
        }
    }

    /// Sign in. A failure surfaces the backend's message and leaves the
    /// session state untouched; success is observed through the state
    /// transition to a resolved phase.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        }

        let generation = self.begin_operation();

        let signed_in = self.identity.sign_in(email, password).await?;
        let user = signed_in.user.clone();
        let session = AuthSession {
            access_token: signed_in.access_token,
            expires_at: signed_in
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            user: user.clone(),
        };

        if !self.apply(generation, Some(session), SessionSnapshot::pending_profile()) {
            return Ok(()); // superseded by a newer operation
        }

        let profile = self.resolve_profile(&user).await;
        self.apply_resolved(generation, profile);
        Ok(())
    }

    /// Sign out. Local session state is cleared unconditionally; the remote
    /// invalidation is attempted afterwards and a failure there is logged
    /// but never blocks the clear.
    pub async fn logout(&self) -> Result<()> {
        let (generation, token) = {
            let mut inner = self.inner.lock().unwrap();
            inner.generation += 1;
            (inner.generation, inner.session.take().map(|s| s.access_token))
        };
        self.publish(generation, SessionSnapshot::unauthenticated());

        if let Some(token) = token {
            if let Err(err) = self.identity.sign_out(&token).await {
                tracing::warn!(error = %err, "Remote sign-out failed; local session already cleared");
            }
        }
        Ok(())
    }

    /// Re-resolve the profile for the current session. No-op without a
    /// session; never touches the session token.
    pub async fn refresh_profile(&self) -> Result<()> {
        let (generation, user) = {
            let mut inner = self.inner.lock().unwrap();
            let Some(session) = inner.session.as_ref() else {
                return Ok(());
            };
            let user = session.user.clone();
            inner.generation += 1;
            (inner.generation, user)
        };

        let profile = self.resolve_profile(&user).await;
        self.apply_resolved(generation, profile);
        Ok(())
    }

    /// Fetch the profile row with bounded retry.
    ///
    /// Retries only while the row is missing or its role is still NULL.
    /// A hard backend error, or exhausting the attempts, degrades to a
    /// profile with role unset rather than failing the operation.
    async fn resolve_profile(&self, user: &AuthUserInfo) -> UserProfile {
        let email = user.email.clone().unwrap_or_default();

        let mut row = None;
        for attempt in 1..=self.retry.max_attempts {
            match self.store.get_profile(user.id).await {
                Err(err) => {
                    tracing::error!(error = %err, attempt, "Profile fetch failed");
                    break;
                }
                Ok(Some(fetched)) if fetched.role.is_some() => {
                    row = Some(fetched);
                    break;
                }
                Ok(_) => {
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay).await;
                    }
                }
            }
        }

        let Some(row) = row else {
            return UserProfile {
                id: user.id,
                name: display_name(None, None, &email),
                email,
                role: None,
                facility_id: None,
                facility_name: None,
            };
        };

        // Secondary read; its failure must not fail resolution.
        let facility_name = match row.facility_id {
            Some(facility_id) => match self.store.get_facility_name(facility_id).await {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!(error = %err, facility_id, "Facility name lookup failed");
                    None
                }
            },
            None => None,
        };

        UserProfile {
            id: user.id,
            name: display_name(row.first_name.as_deref(), row.last_name.as_deref(), &email),
            email,
            role: row.role,
            facility_id: row.facility_id,
            facility_name,
        }
    }

    // ─── Generation-guarded state application ────────────────────

    fn begin_operation(&self) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.generation += 1;
        inner.generation
    }

    /// Install a session and publish a snapshot, unless a newer operation
    /// has started. Returns whether the result was applied.
    fn apply(&self, generation: u64, session: Option<AuthSession>, snapshot: SessionSnapshot) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            return false;
        }
        inner.session = session;
        self.state.send_replace(snapshot);
        true
    }

    fn apply_resolved(&self, generation: u64, profile: UserProfile) -> bool {
        self.publish(generation, SessionSnapshot::resolved(profile))
    }

    /// Publish a snapshot without touching the stored session.
    fn publish(&self, generation: u64, snapshot: SessionSnapshot) -> bool {
        let inner = self.inner.lock().unwrap();
        if inner.generation != generation {
            return false;
        }
        self.state.send_replace(snapshot);
        true
    }
}

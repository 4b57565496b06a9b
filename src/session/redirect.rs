// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Navigation policy applied on session transitions.
//!
//! Role-based redirects fire only on an explicit sign-in or the first page
//! load; a profile refresh never moves the user. Losing the session while
//! on a role-scoped page always sends the user back to the login page.

use crate::session::manager::{SessionPhase, SessionSnapshot};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const PENDING_ACCESS_PATH: &str = "/pending";
pub const OVERSEER_SETUP_PATH: &str = "/overseer-setup";

/// Pages reachable without a session.
pub const PUBLIC_PATHS: [&str; 5] = [
    "/",
    LOGIN_PATH,
    REGISTER_PATH,
    OVERSEER_SETUP_PATH,
    PENDING_ACCESS_PATH,
];

/// Path prefixes that require a session.
pub const ROLE_SCOPED_PREFIXES: [&str; 4] = ["/overseer", "/facility", "/developer", "/admin"];

const PENDING_NOTICE: &str = "Your account is pending setup or approval.";

/// What caused the navigation decision to be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTrigger {
    /// Explicit sign-in just completed.
    SignIn,
    /// First session probe of a page load.
    InitialLoad,
    /// Out-of-band profile refresh.
    Refresh,
}

/// A navigation outcome, with an optional user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub to: &'static str,
    pub notice: Option<&'static str>,
}

impl Navigation {
    fn to(path: &'static str) -> Self {
        Self {
            to: path,
            notice: None,
        }
    }
}

pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

pub fn is_role_scoped(path: &str) -> bool {
    ROLE_SCOPED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Decide whether the user should be moved, given the session state, where
/// they currently are, and what just happened.
pub fn navigation_for(
    snapshot: &SessionSnapshot,
    current_path: &str,
    trigger: NavigationTrigger,
) -> Option<Navigation> {
    match snapshot.phase {
        // Still settling; nothing to decide yet.
        SessionPhase::Initializing | SessionPhase::AuthenticatedPendingProfile => None,

        SessionPhase::Unauthenticated => {
            is_role_scoped(current_path).then(|| Navigation::to(LOGIN_PATH))
        }

        SessionPhase::AuthenticatedWithRole | SessionPhase::AuthenticatedNoRole => {
            if trigger == NavigationTrigger::Refresh {
                return None;
            }
            match snapshot.profile.as_ref().and_then(|p| p.role) {
                Some(role) if is_public_path(current_path) => {
                    Some(Navigation::to(role.home_path()))
                }
                Some(_) => None,
                None if current_path != REGISTER_PATH => Some(Navigation {
                    to: PENDING_ACCESS_PATH,
                    notice: Some(PENDING_NOTICE),
                }),
                None => None,
            }
        }
    }
}

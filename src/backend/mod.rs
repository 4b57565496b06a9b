// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Clients for the managed backend (identity service + row store).

pub mod identity;
pub mod store;

pub use identity::{AuthUserInfo, IdentityClient, SignedInSession};
pub use store::StoreClient;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const FACILITIES: &str = "facilities";
    pub const REGISTRATION_REQUESTS: &str = "registration_requests";
}

// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Middleware modules (authentication, security, etc.).

pub mod auth;
pub mod security;

pub use auth::{require_auth, require_overseer, AuthUser};

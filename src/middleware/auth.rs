// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Authentication middleware.
//!
//! Accepts either the portal session cookie or a bearer token. The token is
//! validated against the identity service and the caller's role is read
//! fresh from the profile row on every request; nothing the client sends
//! can influence the role used for authorization.

use crate::config::SESSION_COOKIE;
use crate::error::AppError;
use crate::models::Role;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use uuid::Uuid;

/// Authenticated caller extracted from the session or bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub facility_id: Option<i64>,
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try the session cookie first, then the Authorization header.
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state
            .sessions
            .get(cookie.value())
            .and_then(|manager| manager.access_token())
            .ok_or(AppError::Unauthorized)?
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let user = state.identity.get_user(&token).await?;
    let profile = state.store.get_profile(user.id).await?;

    let auth_user = AuthUser {
        id: user.id,
        email: user.email,
        role: profile.as_ref().and_then(|p| p.role),
        facility_id: profile.as_ref().and_then(|p| p.facility_id),
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Middleware that additionally requires the Overseer role. Must run after
/// [`require_auth`].
pub async fn require_overseer(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AppError::Unauthorized)?;

    if user.role != Some(Role::Overseer) {
        return Err(AppError::Forbidden(
            "Caller is not an overseer".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

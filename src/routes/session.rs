// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Session routes.
//!
//! The browser never sees the identity service's access token; it holds an
//! opaque session cookie and asks this server what state the session is in
//! and where to navigate.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::SESSION_COOKIE;
use crate::error::{AppError, Result};
use crate::models::{Role, UserProfile};
use crate::session::redirect::{self, navigation_for, NavigationTrigger};
use crate::session::{SessionManager, SessionPhase, SessionSnapshot};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session_probe))
        .route("/auth/refresh-profile", post(refresh_profile))
        .route("/auth/signup", post(overseer_signup))
}

/// Session state plus the navigation decision for the caller's location.
#[derive(Serialize)]
pub struct SessionResponse {
    pub phase: SessionPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

fn session_response(
    snapshot: SessionSnapshot,
    current_path: &str,
    trigger: NavigationTrigger,
) -> SessionResponse {
    let navigation = navigation_for(&snapshot, current_path, trigger);
    SessionResponse {
        phase: snapshot.phase,
        profile: snapshot.profile,
        redirect: navigation.map(|n| n.to.to_string()),
        notice: navigation.and_then(|n| n.notice.map(|s| s.to_string())),
    }
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Where the user currently is, for the redirect decision.
    #[serde(default)]
    pub current_path: Option<String>,
}

/// Sign in. A failure surfaces the identity service's message with no state
/// change; on success the response carries the resolved state and where to
/// go next.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let existing = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.get(cookie.value()));

    let (manager, jar): (Arc<SessionManager>, CookieJar) = match existing {
        Some(manager) => (manager, jar),
        None => {
            let (id, manager) = state.sessions.open(None).await;
            let jar = jar.add(session_cookie(id));
            (manager, jar)
        }
    };

    manager.login(&body.email, &body.password).await?;

    let snapshot = manager.snapshot();
    let path = body.current_path.as_deref().unwrap_or(redirect::LOGIN_PATH);
    Ok((
        jar,
        Json(session_response(snapshot, path, NavigationTrigger::SignIn)),
    ))
}

#[derive(Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub path: Option<String>,
}

/// Initial session probe for a page load. If the caller has no live session
/// entry, a bearer token from a previously persisted session may be offered
/// and will be validated.
async fn session_probe(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let path = query.path.unwrap_or_else(|| "/".to_string());

    if let Some(manager) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.get(cookie.value()))
    {
        let snapshot = manager.snapshot();
        return Ok((
            jar,
            Json(session_response(
                snapshot,
                &path,
                NavigationTrigger::InitialLoad,
            )),
        ));
    }

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    let (id, manager) = state.sessions.open(token).await;
    let jar = jar.add(session_cookie(id));
    let snapshot = manager.snapshot();
    Ok((
        jar,
        Json(session_response(
            snapshot,
            &path,
            NavigationTrigger::InitialLoad,
        )),
    ))
}

/// Sign out. Local state is cleared even if the remote invalidation fails;
/// the caller is always sent to the login page.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let mut jar = jar;
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value().to_string();
        if let Some(manager) = state.sessions.get(&id) {
            manager.logout().await?;
        }
        state.sessions.remove(&id);
        jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    }

    Ok((
        jar,
        Json(SessionResponse {
            phase: SessionPhase::Unauthenticated,
            profile: None,
            redirect: Some(redirect::LOGIN_PATH.to_string()),
            notice: None,
        }),
    ))
}

/// Re-resolve the profile after an out-of-band change. Never navigates.
async fn refresh_profile(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<SessionResponse>> {
    let Some(manager) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| state.sessions.get(cookie.value()))
    else {
        return Err(AppError::Unauthorized);
    };

    manager.refresh_profile().await?;
    let snapshot = manager.snapshot();
    Ok(Json(session_response(
        snapshot,
        "/",
        NavigationTrigger::Refresh,
    )))
}

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub user_id: Uuid,
}

/// Self-service overseer signup, used for initial system setup. Creates the
/// identity and immediately grants the overseer role on its profile.
async fn overseer_signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<SignupResponse>> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user_id = state
        .identity
        .sign_up(&body.email, &body.password, &body.first_name, &body.last_name)
        .await?;

    if let Err(err) = state
        .store
        .set_profile_role(user_id, Role::Overseer, &body.first_name, &body.last_name)
        .await
    {
        return Err(AppError::PartialFailure(format!(
            "Account {} was created but the overseer role could not be assigned: {}",
            user_id, err
        )));
    }

    tracing::info!(user_id = %user_id, "Overseer account created via self-service signup");
    Ok(Json(SignupResponse { user_id }))
}

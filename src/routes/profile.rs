// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Profile self-service routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::profile::display_name;
use crate::models::UserProfile;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/profile", get(get_profile).patch(update_profile))
}

/// Current caller's resolved profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let row = state.store.get_profile(caller.id).await?;
    let email = caller.email.clone().unwrap_or_default();

    let (first, last, facility_id) = match &row {
        Some(row) => (
            row.first_name.clone(),
            row.last_name.clone(),
            row.facility_id,
        ),
        None => (None, None, None),
    };

    let facility_name = match facility_id {
        Some(id) => match state.store.get_facility_name(id).await {
            Ok(name) => name,
            Err(err) => {
                tracing::warn!(error = %err, facility_id = id, "Facility name lookup failed");
                None
            }
        },
        None => None,
    };

    Ok(Json(UserProfile {
        id: caller.id,
        name: display_name(first.as_deref(), last.as_deref(), &email),
        email,
        role: caller.role,
        facility_id,
        facility_name,
    }))
}

#[derive(Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
}

/// Update the caller's name fields. Role and facility are never writable
/// through this route.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(body): Json<ProfileUpdate>,
) -> Result<StatusCode> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .store
        .update_profile_names(caller.id, &body.first_name, &body.last_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

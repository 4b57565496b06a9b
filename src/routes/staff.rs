// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Ministry staff management routes. Overseer-only; the role check happens
//! in the middleware against the caller's profile row.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::StaffUser;
use crate::services::StaffParams;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/staff", get(list_staff).post(create_staff))
        .route("/api/staff/{id}", patch(update_staff).delete(delete_staff))
}

async fn list_staff(State(state): State<Arc<AppState>>) -> Result<Json<Vec<StaffUser>>> {
    Ok(Json(state.staff.list().await?))
}

#[derive(Serialize)]
pub struct StaffCreatedResponse {
    pub id: Uuid,
    /// Present only when the credential was generated server-side; shown once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}

async fn create_staff(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StaffParams>,
) -> Result<Json<StaffCreatedResponse>> {
    let created = state.staff.create(&body).await?;
    Ok(Json(StaffCreatedResponse {
        id: created.id,
        temporary_password: created.temporary_password,
    }))
}

async fn update_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<StaffParams>,
) -> Result<StatusCode> {
    state.staff.update(id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.staff.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

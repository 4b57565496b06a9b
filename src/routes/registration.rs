// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Registration request routes.
//!
//! Submission is public. Listing and approval are overseer-only; rejection
//! requires any authenticated caller, which is looser than approval.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    DeveloperRegistrationData, FacilityRegistrationData, RegistrationRequest, RequestKind, Role,
};
use crate::services::credentials::{generate_temporary_password, DEFAULT_PASSWORD_LENGTH};
use crate::services::ApprovalParams;
use crate::AppState;

/// Routes reachable without a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/registrations/facility", post(submit_facility))
        .route("/api/registrations/developer", post(submit_developer))
}

/// Routes for any authenticated caller.
pub fn authenticated_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/registrations/{id}/reject", post(reject_request))
}

/// Overseer-only routes.
pub fn overseer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/registrations", get(list_requests))
        .route("/api/registrations/{id}/approve", post(approve_request))
}

async fn submit_facility(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FacilityRegistrationData>,
) -> Result<StatusCode> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let data = serde_json::to_value(&body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Payload serialization failed: {}", e)))?;
    state
        .store
        .insert_registration(RequestKind::Facility, &data)
        .await?;

    tracing::info!(facility = %body.facility_name, "Facility registration submitted");
    Ok(StatusCode::CREATED)
}

async fn submit_developer(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeveloperRegistrationData>,
) -> Result<StatusCode> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let data = serde_json::to_value(&body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Payload serialization failed: {}", e)))?;
    state
        .store
        .insert_registration(RequestKind::Developer, &data)
        .await?;

    tracing::info!(organization = %body.organization_name, "Developer registration submitted");
    Ok(StatusCode::CREATED)
}

async fn list_requests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RegistrationRequest>>> {
    Ok(Json(state.store.list_registrations().await?))
}

#[derive(Deserialize)]
pub struct ApproveRequestBody {
    /// Target email; the overseer may have edited it from the payload's default.
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Serialize)]
pub struct ApproveResponse {
    pub success: bool,
    pub user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<i64>,
    /// Shown to the overseer once; never persisted here.
    pub temporary_password: String,
}

async fn approve_request(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveRequestBody>,
) -> Result<Json<ApproveResponse>> {
    // Generated immediately before the workflow runs, surfaced exactly once
    // in the response below.
    let password = generate_temporary_password(DEFAULT_PASSWORD_LENGTH);

    let params = ApprovalParams {
        request_id: id,
        email: body.email,
        name: body.name,
        role: body.role,
    };
    let outcome = state.approvals.approve(caller.id, &params, &password).await?;

    Ok(Json(ApproveResponse {
        success: true,
        user_id: outcome.user_id,
        facility_id: outcome.facility_id,
        temporary_password: password,
    }))
}

async fn reject_request(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.approvals.reject(caller.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

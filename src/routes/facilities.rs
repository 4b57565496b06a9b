// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Facility directory routes.

use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::models::{Facility, FacilityStatus, Role};
use crate::AppState;

pub fn authenticated_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/facilities", get(list_facilities))
}

pub fn overseer_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/facilities/{id}/status", patch(change_status))
}

/// List facilities scoped to the caller: overseers see all, facility
/// administrators see their own facility, everyone else sees none.
async fn list_facilities(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<Facility>>> {
    let facilities = match caller.role {
        Some(Role::Overseer) => state.store.list_facilities(None).await?,
        Some(Role::FacilityAdmin) => match caller.facility_id {
            Some(id) => state.store.list_facilities(Some(id)).await?,
            None => Vec::new(),
        },
        _ => Vec::new(),
    };
    Ok(Json(facilities))
}

#[derive(Deserialize)]
pub struct StatusChange {
    pub status: FacilityStatus,
}

/// Change a facility's verification status. Verification seeds the
/// compliance score and counts the first administrator; anything else
/// zeroes both.
async fn change_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<StatusChange>,
) -> Result<Json<Facility>> {
    let (compliance, administrators) = match body.status {
        FacilityStatus::Verified => (70, 1),
        _ => (0, 0),
    };

    let facility = state
        .store
        .update_facility_status(id, body.status, compliance, administrators)
        .await?;

    tracing::info!(facility_id = id, status = ?body.status, "Facility status updated");
    Ok(Json(facility))
}

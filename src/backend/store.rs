// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Row store client with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (role/facility assignment, name updates)
//! - Facilities (directory, provisioning, status changes)
//! - Registration requests (submission, listing, resolution)
//!
//! All calls go through the backend's REST row API with the service-role
//! key; row-level access control applies to browser clients, not to this
//! server.

use crate::backend::tables;
use crate::error::AppError;
use crate::models::{
    Facility, FacilityStatus, NewFacility, ProfileRow, RegistrationRequest, RequestKind,
    RequestStatus, Role,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

/// Row store client.
#[derive(Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    service_role_key: String,
}

impl StoreClient {
    pub fn new(base_url: String, service_role_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            service_role_key,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
    }

    /// Send a request expecting no body back.
    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<(), AppError> {
        let response = builder
            .header("Prefer", "return=minimal")
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Store request failed: {}", e)))?;
        check_status(response).await?;
        Ok(())
    }

    /// Send a request and parse the row array it returns.
    async fn fetch_rows<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, AppError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Store request failed: {}", e)))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Store response parse error: {}", e)))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile row by identity id. `None` means the row does not
    /// exist yet (the backend trigger may not have run).
    pub async fn get_profile(&self, id: Uuid) -> Result<Option<ProfileRow>, AppError> {
        let rows: Vec<ProfileRow> = self
            .fetch_rows(self.request(reqwest::Method::GET, tables::PROFILES).query(&[
                ("id", format!("eq.{}", id)),
                (
                    "select",
                    "role,facility_id,first_name,last_name".to_string(),
                ),
            ]))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Assign role, facility affiliation, and names in one write.
    /// `facility_id` is written as NULL when absent.
    pub async fn provision_profile(
        &self,
        id: Uuid,
        role: Role,
        facility_id: Option<i64>,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), AppError> {
        self.execute(
            self.request(reqwest::Method::PATCH, tables::PROFILES)
                .query(&[("id", format!("eq.{}", id))])
                .json(&serde_json::json!({
                    "role": role,
                    "facility_id": facility_id,
                    "first_name": first_name,
                    "last_name": last_name,
                })),
        )
        .await
    }

    /// Set role and names without touching facility affiliation.
    pub async fn set_profile_role(
        &self,
        id: Uuid,
        role: Role,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), AppError> {
        self.execute(
            self.request(reqwest::Method::PATCH, tables::PROFILES)
                .query(&[("id", format!("eq.{}", id))])
                .json(&serde_json::json!({
                    "role": role,
                    "first_name": first_name,
                    "last_name": last_name,
                })),
        )
        .await
    }

    /// Self-service name update. Touches name fields and `updated_at` only.
    pub async fn update_profile_names(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), AppError> {
        self.execute(
            self.request(reqwest::Method::PATCH, tables::PROFILES)
                .query(&[("id", format!("eq.{}", id))])
                .json(&serde_json::json!({
                    "first_name": first_name,
                    "last_name": last_name,
                    "updated_at": Utc::now(),
                })),
        )
        .await
    }

    /// List profile rows holding a given role, newest first.
    pub async fn list_profiles_with_role(
        &self,
        role: Role,
    ) -> Result<Vec<StaffProfileRow>, AppError> {
        self.fetch_rows(self.request(reqwest::Method::GET, tables::PROFILES).query(&[
            ("role", format!("eq.{}", role)),
            ("select", "id,first_name,last_name,role".to_string()),
            ("order", "updated_at.desc".to_string()),
        ]))
        .await
    }

    // ─── Facility Operations ─────────────────────────────────────

    /// Look up a facility's display name.
    pub async fn get_facility_name(&self, id: i64) -> Result<Option<String>, AppError> {
        #[derive(Deserialize)]
        struct NameRow {
            name: String,
        }

        let rows: Vec<NameRow> = self
            .fetch_rows(
                self.request(reqwest::Method::GET, tables::FACILITIES)
                    .query(&[
                        ("id", format!("eq.{}", id)),
                        ("select", "name".to_string()),
                    ]),
            )
            .await?;
        Ok(rows.into_iter().next().map(|row| row.name))
    }

    /// List facilities, optionally restricted to a single facility id.
    pub async fn list_facilities(
        &self,
        facility_id: Option<i64>,
    ) -> Result<Vec<Facility>, AppError> {
        let mut params = vec![("select", "*".to_string())];
        if let Some(id) = facility_id {
            params.push(("id", format!("eq.{}", id)));
        }
        self.fetch_rows(
            self.request(reqwest::Method::GET, tables::FACILITIES)
                .query(&params),
        )
        .await
    }

    /// Insert a facility and return its generated id.
    pub async fn insert_facility(&self, facility: &NewFacility) -> Result<i64, AppError> {
        #[derive(Deserialize)]
        struct IdRow {
            id: i64,
        }

        let rows: Vec<IdRow> = self
            .fetch_rows(
                self.request(reqwest::Method::POST, tables::FACILITIES)
                    .header("Prefer", "return=representation")
                    .query(&[("select", "id")])
                    .json(facility),
            )
            .await?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| AppError::Backend("Facility insert returned no id".to_string()))
    }

    /// Update a facility's verification status and the counters that go
    /// with it, returning the updated row.
    pub async fn update_facility_status(
        &self,
        id: i64,
        status: FacilityStatus,
        compliance: i32,
        administrators: i32,
    ) -> Result<Facility, AppError> {
        let rows: Vec<Facility> = self
            .fetch_rows(
                self.request(reqwest::Method::PATCH, tables::FACILITIES)
                    .header("Prefer", "return=representation")
                    .query(&[("id", format!("eq.{}", id))])
                    .json(&serde_json::json!({
                        "status": status,
                        "compliance": compliance,
                        "administrators": administrators,
                    })),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Facility {} not found", id)))
    }

    /// Delete a facility row. Used only to unwind a failed approval.
    pub async fn delete_facility(&self, id: i64) -> Result<(), AppError> {
        self.execute(
            self.request(reqwest::Method::DELETE, tables::FACILITIES)
                .query(&[("id", format!("eq.{}", id))]),
        )
        .await
    }

    // ─── Registration Request Operations ─────────────────────────

    /// Insert a pending registration request with its form payload.
    pub async fn insert_registration(
        &self,
        kind: RequestKind,
        data: &serde_json::Value,
    ) -> Result<(), AppError> {
        self.execute(
            self.request(reqwest::Method::POST, tables::REGISTRATION_REQUESTS)
                .json(&serde_json::json!({
                    "type": kind,
                    "data": data,
                    "status": RequestStatus::Pending,
                })),
        )
        .await
    }

    /// List all registration requests, newest first.
    pub async fn list_registrations(&self) -> Result<Vec<RegistrationRequest>, AppError> {
        self.fetch_rows(
            self.request(reqwest::Method::GET, tables::REGISTRATION_REQUESTS)
                .query(&[
                    ("select", "*".to_string()),
                    ("order", "submitted_at.desc".to_string()),
                ]),
        )
        .await
    }

    /// Get a registration request by id.
    pub async fn get_registration(
        &self,
        id: Uuid,
    ) -> Result<Option<RegistrationRequest>, AppError> {
        let rows: Vec<RegistrationRequest> = self
            .fetch_rows(
                self.request(reqwest::Method::GET, tables::REGISTRATION_REQUESTS)
                    .query(&[
                        ("id", format!("eq.{}", id)),
                        ("select", "*".to_string()),
                    ]),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Record a request's resolution and who resolved it.
    pub async fn set_registration_status(
        &self,
        id: Uuid,
        status: RequestStatus,
        approved_by: Uuid,
    ) -> Result<(), AppError> {
        self.execute(
            self.request(reqwest::Method::PATCH, tables::REGISTRATION_REQUESTS)
                .query(&[("id", format!("eq.{}", id))])
                .json(&serde_json::json!({
                    "status": status,
                    "approved_by": approved_by,
                })),
        )
        .await
    }
}

/// Profile row shape used by the staff directory.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffProfileRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
}

/// Map non-2xx responses to a backend error carrying the body text.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Backend(format!("HTTP {}: {}", status, body)))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Registration request models.
//!
//! Applicants submit a facility or developer onboarding form; the request is
//! stored with its form payload as JSON and resolved exactly once by an
//! approval or rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Discriminant for the two onboarding paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Facility,
    Developer,
}

/// Resolution state. Transitions are one-directional and terminal:
/// pending -> approved or pending -> rejected, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// A stored registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RequestKind,
    /// Form payload; schema depends on `kind`.
    pub data: serde_json::Value,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Uuid>,
}

/// Facility onboarding form. Field names match the stored JSON payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRegistrationData {
    #[validate(length(min = 1))]
    pub facility_name: String,
    #[validate(length(min = 1))]
    pub facility_type: String,
    #[validate(length(min = 1))]
    pub lga: String,
    #[validate(length(min = 1))]
    pub contact_name: String,
    #[validate(email)]
    pub contact_email: String,
    pub contact_phone: String,
}

/// Developer onboarding form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperRegistrationData {
    #[validate(length(min = 1))]
    pub organization_name: String,
    #[validate(length(min = 1))]
    pub system_name: String,
    #[validate(length(min = 1))]
    pub technical_contact_name: String,
    #[validate(email)]
    pub technical_contact_email: String,
    pub use_case: String,
}

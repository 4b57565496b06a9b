// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Facility models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Facility verification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityStatus {
    Verified,
    Pending,
    Rejected,
}

/// An onboarded health facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: i64,
    pub name: String,
    /// Local government area the facility serves.
    pub lga: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: FacilityStatus,
    pub compliance: Option<i32>,
    pub administrators: Option<i32>,
    pub api_activity: Option<String>,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Insert payload for a facility created during registration approval.
#[derive(Debug, Clone, Serialize)]
pub struct NewFacility {
    pub name: String,
    pub lga: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: FacilityStatus,
    pub administrators: i32,
    pub compliance: i32,
    pub api_activity: Option<String>,
    pub last_sync: Option<DateTime<Utc>>,
}

impl NewFacility {
    /// A facility provisioned through approval starts verified with a single
    /// administrator and no compliance history.
    pub fn approved(name: String, lga: String, kind: String) -> Self {
        Self {
            name,
            lga,
            kind,
            status: FacilityStatus::Verified,
            administrators: 1,
            compliance: 0,
            api_activity: None,
            last_sync: None,
        }
    }
}

//! Profile models for the identity-to-role mapping.

use crate::models::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Raw profile row as stored by the row store.
///
/// A skeleton row is created by a backend trigger when the identity is
/// created; role and facility stay NULL until approval assigns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub role: Option<Role>,
    pub facility_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Resolved user profile handed to the portal UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity id, assigned by the identity service at account creation.
    pub id: Uuid,
    pub email: String,
    /// Display name derived from first/last name, falling back to email.
    pub name: String,
    /// None while the account is pending setup or approval.
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<i64>,
    /// Denormalized at read time; absent if the lookup fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_name: Option<String>,
}

/// Join first/last into a display name, falling back to the email address.
pub fn display_name(first: Option<&str>, last: Option<&str>, email: &str) -> String {
    let joined = [first.unwrap_or(""), last.unwrap_or("")]
        .iter()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    if joined.is_empty() {
        if email.is_empty() {
            "User".to_string()
        } else {
            email.to_string()
        }
    } else {
        joined
    }
}

/// Flattened directory row for ministry staff management.
#[derive(Debug, Clone, Serialize)]
pub struct StaffUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub status: StaffStatus,
    pub last_sign_in: Option<DateTime<Utc>>,
}

/// Whether a staff account has ever signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StaffStatus {
    Active,
    Inactive,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Portal roles.
//!
//! The role column in the profile store only ever holds one of these three
//! values (or NULL while an account awaits approval). Anything else is a
//! data error and fails deserialization rather than becoming a fourth state.

use serde::{Deserialize, Serialize};

/// Account role, assigned at approval time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Ministry-level administrator with full visibility and approval authority.
    Overseer,
    /// Administrator scoped to a single affiliated facility.
    FacilityAdmin,
    /// Integration developer scoped to API self-service features.
    Developer,
}

impl Role {
    /// Dashboard landing path for this role.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Overseer => "/overseer/dashboard",
            Role::FacilityAdmin => "/facility/dashboard",
            Role::Developer => "/developer/dashboard",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Overseer => "Overseer",
            Role::FacilityAdmin => "FacilityAdmin",
            Role::Developer => "Developer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_round_trip() {
        for role in [Role::Overseer, Role::FacilityAdmin, Role::Developer] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn test_unknown_role_string_is_rejected() {
        let result: Result<Role, _> = serde_json::from_str("\"SuperAdmin\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_home_paths_are_distinct() {
        let paths = [
            Role::Overseer.home_path(),
            Role::FacilityAdmin.home_path(),
            Role::Developer.home_path(),
        ];
        assert_eq!(
            paths.len(),
            paths.iter().collect::<std::collections::HashSet<_>>().len()
        );
    }
}

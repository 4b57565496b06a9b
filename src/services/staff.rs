// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Ministry staff account management.
//!
//! Staff accounts are identities holding the Overseer role. The directory
//! joins profile rows with the identity service's records for email and
//! sign-in activity; create/update write both sides, rolling the identity
//! back if the role assignment fails.

use crate::backend::identity::AdminUserUpdate;
use crate::backend::{IdentityClient, StoreClient};
use crate::error::{AppError, Result};
use crate::models::{Role, StaffStatus, StaffUser};
use crate::services::credentials::{generate_temporary_password, DEFAULT_PASSWORD_LENGTH};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Payload for creating or updating a staff account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StaffParams {
    #[validate(email)]
    pub email: String,
    /// When absent on create, a temporary credential is generated and
    /// returned exactly once.
    pub password: Option<String>,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub role: Role,
}

/// Result of creating a staff account.
#[derive(Debug, Clone)]
pub struct CreatedStaffUser {
    pub id: Uuid,
    /// Present only when the credential was generated server-side.
    pub temporary_password: Option<String>,
}

#[derive(Clone)]
pub struct StaffService {
    identity: IdentityClient,
    store: StoreClient,
}

impl StaffService {
    pub fn new(identity: IdentityClient, store: StoreClient) -> Self {
        Self { identity, store }
    }

    /// List staff accounts, newest profile change first.
    pub async fn list(&self) -> Result<Vec<StaffUser>> {
        let profiles = self.store.list_profiles_with_role(Role::Overseer).await?;
        let identities = self.identity.admin_list_users().await?;
        let by_id: HashMap<Uuid, _> = identities.into_iter().map(|u| (u.id, u)).collect();

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let identity = by_id.get(&profile.id);
                let last_sign_in = identity.and_then(|i| i.last_sign_in_at);
                StaffUser {
                    id: profile.id,
                    first_name: profile.first_name.unwrap_or_default(),
                    last_name: profile.last_name.unwrap_or_default(),
                    email: identity
                        .and_then(|i| i.email.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                    role: profile.role,
                    status: if last_sign_in.is_some() {
                        StaffStatus::Active
                    } else {
                        StaffStatus::Inactive
                    },
                    last_sign_in,
                }
            })
            .collect())
    }

    /// Create a staff account: identity first, then the role assignment.
    /// If the role write fails the identity is deleted again.
    pub async fn create(&self, params: &StaffParams) -> Result<CreatedStaffUser> {
        validate(params)?;

        let generated = params.password.is_none();
        let password = params
            .password
            .clone()
            .unwrap_or_else(|| generate_temporary_password(DEFAULT_PASSWORD_LENGTH));

        let user_id = self
            .identity
            .admin_create_user(&params.email, &password, &params.first_name, &params.last_name)
            .await?;

        if let Err(err) = self
            .store
            .set_profile_role(user_id, params.role, &params.first_name, &params.last_name)
            .await
        {
            if let Err(delete_err) = self.identity.admin_delete_user(user_id).await {
                tracing::error!(error = %delete_err, user_id = %user_id, "Identity rollback failed");
                return Err(AppError::PartialFailure(format!(
                    "Role assignment failed ({}) and identity {} could not be removed",
                    err, user_id
                )));
            }
            return Err(AppError::Backend(format!(
                "Account created but role assignment failed; identity rolled back: {}",
                err
            )));
        }

        tracing::info!(user_id = %user_id, "Staff account created");
        Ok(CreatedStaffUser {
            id: user_id,
            temporary_password: generated.then_some(password),
        })
    }

    /// Update a staff account's identity fields and profile role/names.
    pub async fn update(&self, id: Uuid, params: &StaffParams) -> Result<()> {
        validate(params)?;

        let update = AdminUserUpdate {
            email: Some(params.email.clone()),
            password: params.password.clone(),
            user_metadata: Some(serde_json::json!({
                "first_name": params.first_name,
                "last_name": params.last_name,
            })),
        };
        self.identity.admin_update_user(id, &update).await?;

        self.store
            .set_profile_role(id, params.role, &params.first_name, &params.last_name)
            .await?;

        tracing::info!(user_id = %id, "Staff account updated");
        Ok(())
    }

    /// Delete a staff account's identity. The profile row is cleaned up by
    /// the backend's cascade.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.identity.admin_delete_user(id).await?;
        tracing::info!(user_id = %id, "Staff account deleted");
        Ok(())
    }
}

fn validate(params: &StaffParams) -> Result<()> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    // The directory only manages ministry-side accounts.
    if params.role != Role::Overseer {
        return Err(AppError::BadRequest(
            "Staff accounts must hold the Overseer role".to_string(),
        ));
    }
    Ok(())
}

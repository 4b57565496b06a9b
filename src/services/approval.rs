// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Registration approval workflow.
//!
//! Converts a pending registration request into a provisioned account:
//! identity creation, facility provisioning for facility requests, role
//! assignment, a best-effort welcome notification, and finally the request
//! bookkeeping. Runs with the service-role clients, so the overseer role
//! check happens in the route layer before this service is reached.
//!
//! Every step that commits a side effect pushes a compensating action; a
//! later failure unwinds the stack in reverse so no orphaned identity or
//! facility row is left behind. The final bookkeeping write is the one
//! step with no compensation: if it fails, the account exists but the
//! request stays pending, and the error says so explicitly.

use crate::backend::{IdentityClient, StoreClient};
use crate::error::{AppError, Result};
use crate::models::{
    FacilityRegistrationData, NewFacility, RegistrationRequest, RequestKind, RequestStatus, Role,
};
use crate::services::notify::WelcomeMailer;
use uuid::Uuid;

/// Inputs for approving a request. The email and display name may have been
/// edited by the overseer from the payload's defaults.
#[derive(Debug, Clone)]
pub struct ApprovalParams {
    pub request_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// What approval created.
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub user_id: Uuid,
    pub facility_id: Option<i64>,
}

/// Side effects that can be undone if a later step fails.
enum Compensation {
    DeleteIdentity(Uuid),
    DeleteFacility(i64),
}

/// Privileged approval/rejection operations.
#[derive(Clone)]
pub struct ApprovalService {
    identity: IdentityClient,
    store: StoreClient,
    mailer: WelcomeMailer,
}

impl ApprovalService {
    pub fn new(identity: IdentityClient, store: StoreClient, mailer: WelcomeMailer) -> Self {
        Self {
            identity,
            store,
            mailer,
        }
    }

    /// Approve a pending request, provisioning the account and (for
    /// facility requests) the facility. `password` is the temporary
    /// credential generated immediately before this call; it is passed to
    /// the identity service and the welcome notification and not retained.
    ///
    /// Double-approval is guarded only by the pending-status precondition;
    /// two racing approvals of the same request are not serialized.
    pub async fn approve(
        &self,
        approver: Uuid,
        params: &ApprovalParams,
        password: &str,
    ) -> Result<ApprovalOutcome> {
        if params.email.trim().is_empty() || params.name.trim().is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Email, name, and credential are required".to_string(),
            ));
        }

        let request = self.load_pending(params.request_id).await?;

        let expected_role = match request.kind {
            RequestKind::Facility => Role::FacilityAdmin,
            RequestKind::Developer => Role::Developer,
        };
        if params.role != expected_role {
            return Err(AppError::BadRequest(format!(
                "A {} request grants the {} role",
                serde_json::to_string(&request.kind).unwrap_or_default(),
                expected_role
            )));
        }

        let (first_name, last_name) = split_name(&params.name);
        let mut compensations: Vec<Compensation> = Vec::new();

        // 1. Create the identity, pre-verified.
        let user_id = self
            .identity
            .admin_create_user(&params.email, password, &first_name, &last_name)
            .await?;
        compensations.push(Compensation::DeleteIdentity(user_id));

        // 2. Facility requests also provision the facility record.
        let facility_id = match request.kind {
            RequestKind::Facility => {
                let new_facility = match facility_from_payload(&request.data) {
                    Ok(facility) => facility,
                    Err(err) => return Err(self.unwind(compensations, err).await),
                };
                match self.store.insert_facility(&new_facility).await {
                    Ok(id) => {
                        compensations.push(Compensation::DeleteFacility(id));
                        Some(id)
                    }
                    Err(err) => return Err(self.unwind(compensations, err).await),
                }
            }
            RequestKind::Developer => None,
        };

        // 3. Assign role and facility affiliation on the profile row.
        if let Err(err) = self
            .store
            .provision_profile(user_id, params.role, facility_id, &first_name, &last_name)
            .await
        {
            return Err(self.unwind(compensations, err).await);
        }

        // 4. Welcome notification; never blocks the approval.
        if let Err(err) = self
            .mailer
            .send_welcome(&params.email, &params.name, password)
        {
            tracing::warn!(error = %err, "Welcome notification failed; continuing");
        }

        // 5. Request bookkeeping. No unwind past this point: the account is
        // live, so a failure here is a partial success the overseer must
        // reconcile manually.
        if let Err(err) = self
            .store
            .set_registration_status(params.request_id, RequestStatus::Approved, approver)
            .await
        {
            return Err(AppError::PartialFailure(format!(
                "Account {} was provisioned but request {} could not be marked approved: {}",
                user_id, params.request_id, err
            )));
        }

        tracing::info!(
            request_id = %params.request_id,
            user_id = %user_id,
            facility_id = ?facility_id,
            role = %params.role,
            "Registration request approved"
        );

        Ok(ApprovalOutcome {
            user_id,
            facility_id,
        })
    }

    /// Reject a pending request. Records who resolved it; creates nothing.
    pub async fn reject(&self, resolver: Uuid, request_id: Uuid) -> Result<()> {
        self.load_pending(request_id).await?;

        self.store
            .set_registration_status(request_id, RequestStatus::Rejected, resolver)
            .await?;

        tracing::info!(request_id = %request_id, resolver = %resolver, "Registration request rejected");
        Ok(())
    }

    async fn load_pending(&self, request_id: Uuid) -> Result<RegistrationRequest> {
        let request = self
            .store
            .get_registration(request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Registration request {} not found", request_id))
            })?;

        if request.status != RequestStatus::Pending {
            return Err(AppError::PreconditionFailed(format!(
                "Registration request {} has already been resolved",
                request_id
            )));
        }
        Ok(request)
    }

    /// Undo committed side effects in reverse order. Compensation failures
    /// are folded into the returned error so the operator knows exactly
    /// what to clean up.
    async fn unwind(&self, compensations: Vec<Compensation>, cause: AppError) -> AppError {
        let mut leftovers = Vec::new();

        for compensation in compensations.into_iter().rev() {
            match compensation {
                Compensation::DeleteFacility(id) => {
                    if let Err(err) = self.store.delete_facility(id).await {
                        tracing::error!(error = %err, facility_id = id, "Facility rollback failed");
                        leftovers.push(format!("facility {}", id));
                    }
                }
                Compensation::DeleteIdentity(id) => {
                    if let Err(err) = self.identity.admin_delete_user(id).await {
                        tracing::error!(error = %err, user_id = %id, "Identity rollback failed");
                        leftovers.push(format!("identity {}", id));
                    }
                }
            }
        }

        if leftovers.is_empty() {
            cause
        } else {
            AppError::PartialFailure(format!(
                "{}; manual cleanup required for: {}",
                cause,
                leftovers.join(", ")
            ))
        }
    }
}

/// Split a display name into first name and the rest.
fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Build the facility insert from the request's form payload.
fn facility_from_payload(data: &serde_json::Value) -> Result<NewFacility> {
    let payload: FacilityRegistrationData = serde_json::from_value(data.clone())
        .map_err(|e| AppError::BadRequest(format!("Malformed facility payload: {}", e)))?;
    Ok(NewFacility::approved(
        payload.facility_name,
        payload.lga,
        payload.facility_type,
    ))
}

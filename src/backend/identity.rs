// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Identity service client.
//!
//! Wraps the managed backend's auth API:
//! - user-scoped calls (sign-in, sign-up, sign-out, token validation) made
//!   with the anonymous key
//! - admin calls (create/update/delete identities) made with the
//!   service-role key, which never leaves this server

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity service client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl IdentityClient {
    pub fn new(base_url: String, anon_key: String, service_role_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            anon_key,
            service_role_key,
        }
    }

    /// Sign in with email and password.
    ///
    /// Failures carry the backend's message so it can be surfaced to the
    /// user verbatim.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedInSession, AppError> {
        let url = format!("{}/auth/v1/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-in request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::AuthFailed(error_message(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-in response parse error: {}", e)))
    }

    /// Self-service sign-up. Returns the new identity id.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Uuid, AppError> {
        let url = format!("{}/auth/v1/signup", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "first_name": first_name, "last_name": last_name },
            }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-up request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::AuthFailed(error_message(response).await));
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-up response parse error: {}", e)))?;

        body.id
            .or(body.user.map(|u| u.id))
            .ok_or_else(|| AppError::Backend("Sign-up returned no identity id".to_string()))
    }

    /// Invalidate the remote session for a token.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let url = format!("{}/auth/v1/logout", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Sign-out request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Sign-out failed: {}",
                error_message(response).await
            )));
        }
        Ok(())
    }

    /// Validate an access token and return the identity it belongs to.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUserInfo, AppError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Token validation request failed: {}", e)))?;

        if response.status().as_u16() == 401 || response.status().as_u16() == 403 {
            return Err(AppError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Token validation failed: {}",
                error_message(response).await
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("User response parse error: {}", e)))
    }

    // ─── Admin Operations (service-role key) ─────────────────────

    /// Create a pre-verified identity. Admin-only.
    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Uuid, AppError> {
        let url = format!("{}/auth/v1/admin/users", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "email_confirm": true,
                "user_metadata": { "first_name": first_name, "last_name": last_name },
            }))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Identity creation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Identity creation failed: {}",
                error_message(response).await
            )));
        }

        let user: AuthUserInfo = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Identity response parse error: {}", e)))?;
        Ok(user.id)
    }

    /// Update an identity's email, credential, or name metadata. Admin-only.
    pub async fn admin_update_user(
        &self,
        id: Uuid,
        update: &AdminUserUpdate,
    ) -> Result<(), AppError> {
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url, id);

        let response = self
            .http
            .put(&url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Identity update request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Identity update failed: {}",
                error_message(response).await
            )));
        }
        Ok(())
    }

    /// Delete an identity. Admin-only.
    pub async fn admin_delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url, id);

        let response = self
            .http
            .delete(&url)
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Identity deletion request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Identity deletion failed: {}",
                error_message(response).await
            )));
        }
        Ok(())
    }

    /// List identities for the staff directory join. Admin-only.
    pub async fn admin_list_users(&self) -> Result<Vec<AdminUserRecord>, AppError> {
        let url = format!("{}/auth/v1/admin/users", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("per_page", "1000")])
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Identity list request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Backend(format!(
                "Identity list failed: {}",
                error_message(response).await
            )));
        }

        let body: AdminUserList = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Identity list parse error: {}", e)))?;
        Ok(body.users)
    }
}

/// Best-effort extraction of the backend's error message from a response.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if let Ok(parsed) = serde_json::from_str::<AuthErrorBody>(&body) {
        if let Some(msg) = parsed
            .error_description
            .or(parsed.msg)
            .or(parsed.error)
            .filter(|m| !m.is_empty())
        {
            return msg;
        }
    }
    format!("HTTP {}: {}", status, body)
}

#[derive(Deserialize)]
struct AuthErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    error: Option<String>,
}

/// Session returned by a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct SignedInSession {
    pub access_token: String,
    /// Unix timestamp of token expiry, when the backend provides one.
    pub expires_at: Option<i64>,
    pub user: AuthUserInfo,
}

/// Identity as reported by the auth API.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUserInfo {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct SignUpResponse {
    id: Option<Uuid>,
    user: Option<AuthUserInfo>,
}

/// Admin update payload. Omitted fields are left unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<serde_json::Value>,
}

/// Identity record from the admin list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUserRecord {
    pub id: Uuid,
    pub email: Option<String>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct AdminUserList {
    users: Vec<AdminUserRecord>,
}

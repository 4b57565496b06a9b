// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Shared test harness.
//!
//! Tests run the real router and the real backend clients against a
//! wiremock server standing in for the managed backend. The retry delay is
//! shortened so profile-resolution tests stay fast.

use hie_portal::config::Config;
use hie_portal::routes::create_router;
use hie_portal::session::RetryPolicy;
use hie_portal::AppState;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointing at the mock backend.
#[allow(dead_code)]
pub fn test_config(backend_url: &str) -> Config {
    Config {
        backend_url: backend_url.trim_end_matches('/').to_string(),
        service_role_key: "test_service_role_key".to_string(),
        anon_key: "test_anon_key".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
        port: 8080,
    }
}

#[allow(dead_code)]
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        delay: Duration::from_millis(1),
    }
}

/// Create a test app backed by a fresh mock backend.
/// Returns the router, the shared state, and the mock server.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>, MockServer) {
    let server = MockServer::start().await;
    let state = Arc::new(AppState::new(test_config(&server.uri()), fast_retry()));
    (create_router(state.clone()), state, server)
}

/// Mock token validation for a bearer token.
#[allow(dead_code)]
pub async fn mount_get_user(server: &MockServer, token: &str, user_id: Uuid, email: &str) {
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": user_id, "email": email })),
        )
        .mount(server)
        .await;
}

/// Mock the profile row fetch for an identity.
#[allow(dead_code)]
pub async fn mount_profile(
    server: &MockServer,
    user_id: Uuid,
    role: Option<&str>,
    facility_id: Option<i64>,
) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", user_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "role": role,
            "facility_id": facility_id,
            "first_name": "Test",
            "last_name": "User",
        }])))
        .mount(server)
        .await;
}

/// Mock a successful password sign-in.
#[allow(dead_code)]
pub async fn mount_sign_in(server: &MockServer, token: &str, user_id: Uuid, email: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_at": 4102444800i64,
            "user": { "id": user_id, "email": email },
        })))
        .mount(server)
        .await;
}

/// Extract the session cookie ("name=value") from a response.
#[allow(dead_code)]
pub fn session_cookie_from(response: &axum::http::Response<axum::body::Body>) -> String {
    let set_cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("cookie header should have a value")
        .to_string()
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

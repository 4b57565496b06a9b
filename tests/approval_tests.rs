// SPDX-License-Identifier: MIT
// Copyright 2026 HIE Portal Contributors

//! Registration approval workflow tests.
//!
//! Each test drives the real route with a mock backend and injects faults
//! at individual steps to verify the compensation behavior: a failure after
//! identity creation unwinds the identity, a failure after facility
//! creation unwinds both, and a bookkeeping failure at the end is reported
//! as a partial success with nothing unwound.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::*;

const OVERSEER_TOKEN: &str = "overseer-token";

struct Fixture {
    app: axum::Router,
    server: MockServer,
    overseer_id: Uuid,
    request_id: Uuid,
}

/// App with an authenticated overseer and a stored registration request.
async fn fixture(request_kind: &str, status: &str) -> Fixture {
    let (app, _state, server) = create_test_app().await;
    let overseer_id = Uuid::new_v4();
    mount_get_user(&server, OVERSEER_TOKEN, overseer_id, "overseer@ministry.org").await;
    mount_profile(&server, overseer_id, Some("Overseer"), None).await;

    let request_id = Uuid::new_v4();
    let data = match request_kind {
        "facility" => json!({
            "facilityName": "General Hospital",
            "facilityType": "Secondary",
            "lga": "Ilorin West",
            "contactName": "Ada Bello",
            "contactEmail": "ada@clinic.org",
            "contactPhone": "+2348000000000",
        }),
        _ => json!({
            "organizationName": "HealthSoft",
            "systemName": "EMR Bridge",
            "technicalContactName": "Chidi Eze",
            "technicalContactEmail": "chidi@healthsoft.io",
            "useCase": "Lab result submission",
        }),
    };
    Mock::given(method("GET"))
        .and(path("/rest/v1/registration_requests"))
        .and(query_param("id", format!("eq.{}", request_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": request_id,
            "type": request_kind,
            "data": data,
            "status": status,
            "submitted_at": "2026-08-01T10:00:00Z",
            "approved_by": null,
        }])))
        .mount(&server)
        .await;

    Fixture {
        app,
        server,
        overseer_id,
        request_id,
    }
}

fn approve_request(request_id: Uuid, role: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/registrations/{}/approve", request_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&json!({
                "email": "ada@clinic.org",
                "name": "Ada Bello",
                "role": role,
            }))
            .unwrap(),
        ))
        .unwrap()
}

fn reject_request(request_id: Uuid, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/registrations/{}/reject", request_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn mount_create_identity(server: &MockServer, new_user_id: Uuid, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .and(body_partial_json(json!({
            "email": "ada@clinic.org",
            "email_confirm": true,
            "user_metadata": { "first_name": "Ada", "last_name": "Bello" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": new_user_id,
            "email": "ada@clinic.org",
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_delete_identity(server: &MockServer, user_id: Uuid, times: u64) {
    Mock::given(method("DELETE"))
        .and(path(format!("/auth/v1/admin/users/{}", user_id).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_approving_facility_request_provisions_everything() {
    let fx = fixture("facility", "pending").await;
    let new_user_id = Uuid::new_v4();

    mount_create_identity(&fx.server, new_user_id, 1).await;

    // Facility is created verified, with its first administrator counted.
    Mock::given(method("POST"))
        .and(path("/rest/v1/facilities"))
        .and(body_partial_json(json!({
            "name": "General Hospital",
            "lga": "Ilorin West",
            "type": "Secondary",
            "status": "verified",
            "administrators": 1,
            "compliance": 0,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 42 }])))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", new_user_id).as_str()))
        .and(body_partial_json(json!({
            "role": "FacilityAdmin",
            "facility_id": 42,
            "first_name": "Ada",
            "last_name": "Bello",
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/registration_requests"))
        .and(query_param("id", format!("eq.{}", fx.request_id).as_str()))
        .and(body_partial_json(json!({
            "status": "approved",
            "approved_by": fx.overseer_id,
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(approve_request(fx.request_id, "FacilityAdmin", OVERSEER_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user_id"], new_user_id.to_string());
    assert_eq!(body["facility_id"], 42);

    // The temporary credential is surfaced exactly once, fully composed.
    let password = body["temporary_password"].as_str().unwrap();
    assert_eq!(password.len(), 12);
    assert!(password.bytes().any(|c| c.is_ascii_lowercase()));
    assert!(password.bytes().any(|c| c.is_ascii_uppercase()));
    assert!(password.bytes().any(|c| c.is_ascii_digit()));
    assert!(password.bytes().any(|c| !c.is_ascii_alphanumeric()));

    fx.server.verify().await;
}

#[tokio::test]
async fn test_approving_developer_request_creates_no_facility() {
    let fx = fixture("developer", "pending").await;
    let new_user_id = Uuid::new_v4();

    mount_create_identity(&fx.server, new_user_id, 1).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/facilities"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 99 }])))
        .expect(0)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(body_partial_json(json!({
            "role": "Developer",
            "facility_id": null,
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/registration_requests"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(approve_request(fx.request_id, "Developer", OVERSEER_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_id"], new_user_id.to_string());
    assert!(body.get("facility_id").is_none() || body["facility_id"].is_null());

    fx.server.verify().await;
}

#[tokio::test]
async fn test_approving_resolved_request_fails_precondition_with_no_side_effects() {
    for status in ["approved", "rejected"] {
        let fx = fixture("facility", status).await;

        // No provisioning of any kind may happen.
        Mock::given(method("POST"))
            .and(path("/auth/v1/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&fx.server)
            .await;

        let response = fx
            .app
            .oneshot(approve_request(fx.request_id, "FacilityAdmin", OVERSEER_TOKEN))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "precondition_failed");

        fx.server.verify().await;
    }
}

#[tokio::test]
async fn test_facility_insert_failure_unwinds_identity() {
    let fx = fixture("facility", "pending").await;
    let new_user_id = Uuid::new_v4();

    mount_create_identity(&fx.server, new_user_id, 1).await;
    mount_delete_identity(&fx.server, new_user_id, 1).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/facilities"))
        .respond_with(ResponseTemplate::new(500).set_body_string("insert failed"))
        .expect(1)
        .mount(&fx.server)
        .await;

    // The request must stay pending.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/registration_requests"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(approve_request(fx.request_id, "FacilityAdmin", OVERSEER_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    fx.server.verify().await;
}

#[tokio::test]
async fn test_profile_update_failure_unwinds_facility_and_identity() {
    let fx = fixture("facility", "pending").await;
    let new_user_id = Uuid::new_v4();

    mount_create_identity(&fx.server, new_user_id, 1).await;
    mount_delete_identity(&fx.server, new_user_id, 1).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/facilities"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 42 }])))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", new_user_id).as_str()))
        .respond_with(ResponseTemplate::new(500).set_body_string("update failed"))
        .expect(1)
        .mount(&fx.server)
        .await;

    // Facility created in the failed attempt is rolled back too.
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/facilities"))
        .and(query_param("id", "eq.42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/registration_requests"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(approve_request(fx.request_id, "FacilityAdmin", OVERSEER_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    fx.server.verify().await;
}

#[tokio::test]
async fn test_bookkeeping_failure_reports_partial_success_without_unwind() {
    let fx = fixture("facility", "pending").await;
    let new_user_id = Uuid::new_v4();

    mount_create_identity(&fx.server, new_user_id, 1).await;
    mount_delete_identity(&fx.server, new_user_id, 0).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/facilities"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{ "id": 42 }])))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("id", format!("eq.{}", new_user_id).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/registration_requests"))
        .respond_with(ResponseTemplate::new(500).set_body_string("write failed"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(approve_request(fx.request_id, "FacilityAdmin", OVERSEER_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // Distinct from a clean failure: the caller is told the account exists.
    let body = body_json(response).await;
    assert_eq!(body["error"], "partial_failure");
    let details = body["details"].as_str().unwrap();
    assert!(details.contains(&new_user_id.to_string()));

    fx.server.verify().await;
}

#[tokio::test]
async fn test_role_must_match_request_kind() {
    let fx = fixture("facility", "pending").await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(approve_request(fx.request_id, "Developer", OVERSEER_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    fx.server.verify().await;
}

#[tokio::test]
async fn test_non_overseer_cannot_approve() {
    let fx = fixture("facility", "pending").await;
    let admin_id = Uuid::new_v4();
    mount_get_user(&fx.server, "facility-admin-token", admin_id, "admin@clinic.org").await;
    mount_profile(&fx.server, admin_id, Some("FacilityAdmin"), Some(7)).await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(approve_request(fx.request_id, "FacilityAdmin", "facility-admin-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    fx.server.verify().await;
}

#[tokio::test]
async fn test_rejection_only_requires_an_authenticated_caller() {
    // Rejection's role requirement is looser than approval's: any
    // authenticated caller may reject.
    let fx = fixture("facility", "pending").await;
    let admin_id = Uuid::new_v4();
    mount_get_user(&fx.server, "facility-admin-token", admin_id, "admin@clinic.org").await;
    mount_profile(&fx.server, admin_id, Some("FacilityAdmin"), Some(7)).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/registration_requests"))
        .and(query_param("id", format!("eq.{}", fx.request_id).as_str()))
        .and(body_partial_json(json!({
            "status": "rejected",
            "approved_by": admin_id,
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(reject_request(fx.request_id, "facility-admin-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    fx.server.verify().await;
}

#[tokio::test]
async fn test_rejecting_resolved_request_fails_precondition() {
    let fx = fixture("facility", "rejected").await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/registration_requests"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&fx.server)
        .await;

    let response = fx
        .app
        .oneshot(reject_request(fx.request_id, OVERSEER_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    fx.server.verify().await;
}

#[tokio::test]
async fn test_approval_requires_authentication() {
    let fx = fixture("facility", "pending").await;

    let response = fx
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/registrations/{}/approve", fx.request_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "email": "ada@clinic.org",
                        "name": "Ada Bello",
                        "role": "FacilityAdmin",
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

//! # Integration Tests for leasehold-api
//!
//! Drives the full router with `oneshot`: health probes, the public
//! catalog, the booking → approval → termination workflow, error mapping,
//! role checks with and without a configured secret, and the reports.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use leasehold_api::middleware::metrics::ApiMetrics;
use leasehold_api::state::{AppConfig, AppState};

/// Auth disabled: no header means anonymous admin.
fn test_app() -> axum::Router {
    leasehold_api::app(AppState::new())
}

fn test_app_with_auth(token: &str) -> axum::Router {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    };
    leasehold_api::app(AppState::with_engine(leasehold_engine::Engine::new(), config))
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = auth {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Create a tower with one flat and a registered user. Returns
/// `(tower_id, flat_id, user_id)`.
async fn seed_catalog(app: &axum::Router) -> (u64, u64, u64) {
    let (status, tower) = send(
        app,
        "POST",
        "/api/admin/towers",
        None,
        Some(json!({"name": "Maple", "address": "1 Main St", "total_floors": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{tower}");
    let tower_id = tower["id"].as_u64().unwrap();

    let (status, flat) = send(
        app,
        "POST",
        "/api/admin/flats",
        None,
        Some(json!({
            "tower_id": tower_id,
            "unit_number": "101",
            "floor": 1,
            "bedrooms": 2,
            "bathrooms": 1,
            "rent": "1200.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{flat}");
    let flat_id = flat["id"].as_u64().unwrap();

    let (status, user) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": "tenant@example.com", "name": "Tess"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{user}");
    assert_eq!(user["role"], "user");
    let user_id = user["id"].as_u64().unwrap();

    (tower_id, flat_id, user_id)
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_health_probes() {
    let app = test_app_with_auth("s3cret");
    let (status, body) = send(&app, "GET", "/health/liveness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
    let (status, body) = send(&app, "GET", "/health/readiness", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ready".into()));
}

// -- Workflow -----------------------------------------------------------------

#[tokio::test]
async fn test_booking_approval_termination_workflow() {
    let app = test_app();
    let (tower_id, flat_id, user_id) = seed_catalog(&app).await;
    let tenant = format!("user:{user_id}");

    let (status, booking) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&tenant),
        Some(json!({"flat_id": flat_id, "requested_date": "2026-11-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{booking}");
    assert_eq!(booking["status"], "pending");
    let booking_id = booking["id"].as_u64().unwrap();

    let (status, mine) = send(&app, "GET", "/api/bookings", Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, approval) = send(
        &app,
        "PUT",
        &format!("/api/admin/bookings/{booking_id}/approve"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{approval}");
    assert_eq!(approval["booking"]["status"], "approved");
    assert_eq!(approval["lease"]["status"], "active");
    assert_eq!(approval["lease"]["start_date"], "2026-11-01");
    assert_eq!(approval["lease"]["monthly_rent"], "1200.00");
    let lease_id = approval["lease"]["id"].as_u64().unwrap();

    // Leased flats leave the public search but stay in the admin listing.
    let (_, public) = send(&app, "GET", "/api/flats", None, None).await;
    assert!(public.as_array().unwrap().is_empty());
    let (_, admin) = send(&app, "GET", "/api/admin/flats", None, None).await;
    assert_eq!(admin[0]["is_available"], false);

    let (_, details) = send(&app, "GET", &format!("/api/towers/{tower_id}"), None, None).await;
    assert_eq!(details["available_flats"], 0);

    let (_, tenants) = send(&app, "GET", "/api/admin/tenants", None, None).await;
    assert_eq!(tenants.as_array().unwrap().len(), 1);

    let (status, lease) = send(
        &app,
        "PUT",
        &format!("/api/admin/leases/{lease_id}/terminate"),
        None,
        Some(json!({"end_date": "2027-04-30"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{lease}");
    assert_eq!(lease["status"], "terminated");
    assert_eq!(lease["end_date"], "2027-04-30");

    let (_, public) = send(&app, "GET", "/api/flats", None, None).await;
    assert_eq!(public.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_booking_conflicts_and_invalid_state() {
    let app = test_app();
    let (_, flat_id, user_id) = seed_catalog(&app).await;
    let tenant = format!("user:{user_id}");
    let body = json!({"flat_id": flat_id, "requested_date": "2026-11-01"});

    let (_, booking) = send(&app, "POST", "/api/bookings", Some(&tenant), Some(body.clone())).await;
    let booking_id = booking["id"].as_u64().unwrap();

    let (status, err) = send(&app, "POST", "/api/bookings", Some(&tenant), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"]["code"], "CONFLICT");

    let approve = format!("/api/admin/bookings/{booking_id}/approve");
    let (status, _) = send(&app, "PUT", &approve, None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, err) = send(&app, "PUT", &approve, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"]["code"], "INVALID_STATE");

    let decline = format!("/api/admin/bookings/{booking_id}/decline");
    let (status, err) = send(&app, "PUT", &decline, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"]["code"], "INVALID_STATE");

    // The flat is leased now.
    let (status, err) = send(&app, "POST", "/api/bookings", Some(&tenant), Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"]["message"].as_str().unwrap().contains("not available"));
}

#[tokio::test]
async fn test_other_users_booking_is_not_found() {
    let app = test_app();
    let (_, flat_id, user_id) = seed_catalog(&app).await;
    let (_, other) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": "other@example.com", "name": "Omar"})),
    )
    .await;
    let other_id = other["id"].as_u64().unwrap();

    let (_, booking) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&format!("user:{user_id}")),
        Some(json!({"flat_id": flat_id, "requested_date": "2026-11-01"})),
    )
    .await;
    let uri = format!("/api/bookings/{}", booking["id"]);

    let (status, _) = send(&app, "GET", &uri, Some(&format!("user:{user_id}")), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, err) = send(&app, "GET", &uri, Some(&format!("user:{other_id}")), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_lease_ends_it_today() {
    let app = test_app();
    let (_, flat_id, user_id) = seed_catalog(&app).await;
    let (_, booking) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&format!("user:{user_id}")),
        Some(json!({"flat_id": flat_id, "requested_date": "2024-01-01"})),
    )
    .await;
    let (_, approval) = send(
        &app,
        "PUT",
        &format!("/api/admin/bookings/{}/approve", booking["id"]),
        None,
        None,
    )
    .await;
    let uri = format!("/api/admin/leases/{}", approval["lease"]["id"]);

    let (status, lease) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK, "{lease}");
    assert_eq!(lease["status"], "terminated");
    assert!(lease["end_date"].is_string());

    let (_, flat) = send(&app, "GET", &format!("/api/flats/{flat_id}"), None, None).await;
    assert_eq!(flat["is_available"], true);

    let (status, err) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"]["code"], "INVALID_STATE");

    let (status, _) = send(&app, "DELETE", "/api/admin/leases/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Current user -------------------------------------------------------------

#[tokio::test]
async fn test_me_returns_caller_profile() {
    let app = test_app();
    let (_, _, user_id) = seed_catalog(&app).await;

    let (status, me) = send(&app, "GET", "/api/auth/me", Some(&format!("user:{user_id}")), None).await;
    assert_eq!(status, StatusCode::OK, "{me}");
    assert_eq!(me["id"], user_id);
    assert_eq!(me["email"], "tenant@example.com");
    assert_eq!(me["role"], "user");

    // An anonymous admin names no user.
    let (status, err) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("user:999"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_me_requires_token_when_secret_configured() {
    let app = test_app_with_auth("s3cret");
    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// -- Error mapping ------------------------------------------------------------

#[tokio::test]
async fn test_validation_and_malformed_bodies() {
    let app = test_app();

    let (status, err) = send(
        &app,
        "POST",
        "/api/admin/towers",
        None,
        Some(json!({"name": "Empty", "total_floors": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["error"]["code"], "VALIDATION_ERROR");

    let (status, err) = send(
        &app,
        "POST",
        "/api/admin/towers",
        None,
        Some(json!({"name": "No floors"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(
        &app,
        "POST",
        "/api/admin/flats",
        None,
        Some(json!({"tower_id": 99, "unit_number": "1", "floor": 1, "rent": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/amenities?type=sauna", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "GET", "/api/admin/reports/bookings?period=decade", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    let body = json!({"email": "dup@example.com", "name": "A"});
    let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": "DUP@example.com", "name": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_tower_with_flats_cannot_be_deleted() {
    let app = test_app();
    let (tower_id, _, _) = seed_catalog(&app).await;
    let (status, err) = send(&app, "DELETE", &format!("/api/admin/towers/{tower_id}"), None, None).await;
    assert_eq!(status, StatusCode::CONFLICT, "{err}");
}

// -- Authorization ------------------------------------------------------------

#[tokio::test]
async fn test_roles_with_configured_secret() {
    let app = test_app_with_auth("s3cret");

    let (status, _) = send(&app, "GET", "/api/towers", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/admin/towers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/admin/towers", Some("user:1:s3cret"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/admin/towers", Some("admin::wrong"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/admin/towers", Some("admin::s3cret"), None).await;
    assert_eq!(status, StatusCode::OK);

    // An admin token without a user id cannot act as a tenant.
    let (status, _) = send(&app, "GET", "/api/bookings", Some("admin::s3cret"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_booking_for_unknown_user_is_not_found() {
    let app = test_app();
    let (_, flat_id, _) = seed_catalog(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/bookings",
        Some("user:77"),
        Some(json!({"flat_id": flat_id, "requested_date": "2026-11-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Reports ------------------------------------------------------------------

#[tokio::test]
async fn test_reports() {
    let app = test_app();
    let (_, flat_id, user_id) = seed_catalog(&app).await;
    let (_, booking) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(&format!("user:{user_id}")),
        Some(json!({"flat_id": flat_id, "requested_date": "2026-11-01"})),
    )
    .await;
    send(
        &app,
        "PUT",
        &format!("/api/admin/bookings/{}/approve", booking["id"]),
        None,
        None,
    )
    .await;

    let (status, occupancy) = send(&app, "GET", "/api/admin/reports/occupancy", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(occupancy[0]["occupancy_percentage"], 100);

    let (status, report) = send(&app, "GET", "/api/admin/reports/bookings", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["period"], "month");
    assert_eq!(report["total"]["approved"], 1);
    assert_eq!(report["period_counts"]["total"], 1);

    let (status, payments) = send(&app, "GET", "/api/admin/reports/payments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payments["active_leases_count"], 1);
    assert_eq!(payments["total_expected_monthly"], "1200.00");
    assert_eq!(payments["monthly_breakdown"].as_array().unwrap().len(), 6);

    let (_, payments) = send(&app, "GET", "/api/admin/reports/payments?months=2", None, None).await;
    assert_eq!(payments["monthly_breakdown"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_payment_report_months_window_is_bounded() {
    let app = test_app();
    for months in ["0", "121", "18446744073709551615"] {
        let uri = format!("/api/admin/reports/payments?months={months}");
        let (status, err) = send(&app, "GET", &uri, None, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "months={months}");
        assert_eq!(err["error"]["code"], "VALIDATION_ERROR");
    }

    let (status, report) = send(&app, "GET", "/api/admin/reports/payments?months=120", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["monthly_breakdown"].as_array().unwrap().len(), 120);
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_count_requests_and_errors() {
    let metrics = ApiMetrics::new();
    let app = leasehold_api::app_with_metrics(AppState::new(), metrics.clone());
    send(&app, "GET", "/api/towers", None, None).await;
    send(&app, "GET", "/api/towers/42", None, None).await;
    assert_eq!(metrics.requests(), 2);
    assert_eq!(metrics.errors(), 1);
}

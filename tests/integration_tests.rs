use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use shearbook::config::AppConfig;
use shearbook::db;
use shearbook::router::build_router;
use shearbook::services::auth;
use shearbook::services::availability::AvailabilityCache;
use shearbook::state::AppState;

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        token_ttl_minutes: 60,
        admin_email: "admin@test.local".to_string(),
        admin_password: "admin-password".to_string(),
        availability_cache_ttl_secs: 30,
    }
}

fn test_app() -> Router {
    let config = test_config();
    let conn = db::init_db(":memory:").unwrap();

    let hash = auth::hash_password(&config.admin_password).unwrap();
    db::queries::accounts::seed_admin(&conn, "admin-1", &config.admin_email, &hash).unwrap();

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config,
        availability_cache: AvailabilityCache::new(Duration::from_secs(30)),
    });
    build_router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn send_raw(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({ "email": "admin@test.local", "password": "admin-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Create a shop (plus its first admin) and return (shop json, shop admin token).
async fn setup_shop(app: &Router, slug: &str) -> (Value, String) {
    let admin = admin_token(app).await;
    let (status, shop) = send(
        app,
        "POST",
        "/api/barbershops",
        Some(&admin),
        Some(json!({
            "name": format!("{slug} barbershop"),
            "slug": slug,
            "admin_name": "Owner",
            "admin_email": format!("owner@{slug}.example.com"),
            "admin_password": "owner-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create shop failed: {shop}");

    let (status, login) = send(
        app,
        "POST",
        "/api/auth/shop/login",
        None,
        Some(json!({
            "email": format!("owner@{slug}.example.com"),
            "password": "owner-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "shop login failed: {login}");

    (shop, login["token"].as_str().unwrap().to_string())
}

async fn create_barber(app: &Router, shop_token: &str, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/barbers",
        Some(shop_token),
        Some(json!({ "name": name, "email": email, "password": "barber-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create barber failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

async fn create_service(
    app: &Router,
    shop_token: &str,
    name: &str,
    duration_minutes: i64,
    price_cents: i64,
) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/services",
        Some(shop_token),
        Some(json!({
            "name": name,
            "duration_minutes": duration_minutes,
            "price_cents": price_cents,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create service failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

async fn register_customer(app: &Router, slug: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/customer/register",
        None,
        Some(json!({
            "slug": slug,
            "name": "Test Customer",
            "email": email,
            "password": "customer-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "customer register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn book(
    app: &Router,
    token: &str,
    barber_id: &str,
    service_ids: &[&str],
    start_time: &str,
) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/appointments",
        Some(token),
        Some(json!({
            "barber_id": barber_id,
            "service_ids": service_ids,
            "start_time": start_time,
        })),
    )
    .await
}

// ── Health & auth ──

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_admin_login_wrong_password() {
    let app = test_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({ "email": "admin@test.local", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_validation_reports_fields() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/admin/login",
        None,
        Some(json!({ "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field"], "email");
    assert_eq!(fields[1]["field"], "password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    let (status, _) = send(&app, "GET", "/api/barbershops", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/barbers", Some("garbage-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_shop_admin_cannot_manage_barbershops() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "fade-factory").await;

    let (status, _) = send(&app, "GET", "/api/barbershops", Some(&shop_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_central_admin_cannot_use_tenant_routes() {
    let app = test_app();
    let admin = admin_token(&app).await;

    let (status, _) = send(&app, "GET", "/api/barbers", Some(&admin), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Barbershops ──

#[tokio::test]
async fn test_create_barbershop_validates_input() {
    let app = test_app();
    let admin = admin_token(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/barbershops",
        Some(&admin),
        Some(json!({ "name": "", "slug": "Bad Slug!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_duplicate_slug_conflict() {
    let app = test_app();
    let admin = admin_token(&app).await;
    setup_shop(&app, "main-street").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/barbershops",
        Some(&admin),
        Some(json!({
            "name": "Copycat",
            "slug": "main-street",
            "admin_name": "Owner",
            "admin_email": "copy@example.com",
            "admin_password": "owner-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn test_barbershop_crud_roundtrip() {
    let app = test_app();
    let admin = admin_token(&app).await;
    let (shop, _) = setup_shop(&app, "crud-shop").await;
    let shop_id = shop["id"].as_str().unwrap();

    let (status, got) = send(
        &app,
        "GET",
        &format!("/api/barbershops/{shop_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(got["slug"], "crud-shop");

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/barbershops/{shop_id}"),
        Some(&admin),
        Some(json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/barbershops/{shop_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/barbershops/{shop_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Tenant CRUD ──

#[tokio::test]
async fn test_service_duplicate_name_within_shop_only() {
    let app = test_app();
    let (_, token_a) = setup_shop(&app, "shop-a").await;
    let (_, token_b) = setup_shop(&app, "shop-b").await;

    create_service(&app, &token_a, "Haircut", 30, 2500).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/services",
        Some(&token_a),
        Some(json!({ "name": "Haircut", "duration_minutes": 45, "price_cents": 3000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The same name in another tenant is fine.
    let (status, _) = send(
        &app,
        "POST",
        "/api/services",
        Some(&token_b),
        Some(json!({ "name": "Haircut", "duration_minutes": 30, "price_cents": 2000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_tenant_isolation_in_listings() {
    let app = test_app();
    let (_, token_a) = setup_shop(&app, "north-side").await;
    let (_, token_b) = setup_shop(&app, "south-side").await;

    create_barber(&app, &token_a, "Alice", "alice@north.example.com").await;
    create_barber(&app, &token_b, "Bob", "bob@south.example.com").await;

    let (status, list_a) = send(&app, "GET", "/api/barbers", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list_a
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice"]);
}

#[tokio::test]
async fn test_cross_tenant_lookup_is_not_found() {
    let app = test_app();
    let (_, token_a) = setup_shop(&app, "east-end").await;
    let (_, token_b) = setup_shop(&app, "west-end").await;

    let barber_id = create_barber(&app, &token_a, "Alice", "alice@east.example.com").await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/barbers/{barber_id}"),
        Some(&token_b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_cannot_write_catalog() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "locked-down").await;
    create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer = register_customer(&app, "locked-down", "c@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/services",
        Some(&customer),
        Some(json!({ "name": "Sneaky", "duration_minutes": 30, "price_cents": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // But reading the catalog is allowed.
    let (status, list) = send(&app, "GET", "/api/services", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

// ── Booking workflow ──

#[tokio::test]
async fn test_booking_end_time_is_sum_of_service_durations() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "sum-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@sum.example.com").await;
    let cut = create_service(&app, &shop_token, "Haircut", 45, 2500).await;
    let shave = create_service(&app, &shop_token, "Shave", 30, 1500).await;
    let customer = register_customer(&app, "sum-shop", "c@sum.example.com").await;

    let (status, appt) = book(
        &app,
        &customer,
        &barber,
        &[cut.as_str(), shave.as_str()],
        "2030-06-16 10:00",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{appt}");
    assert_eq!(appt["status"], "pending");
    assert_eq!(appt["start_time"], "2030-06-16T10:00:00");
    assert_eq!(appt["end_time"], "2030-06-16T11:15:00");
    assert_eq!(appt["service_ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_booking_conflict_scenario() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "conflict-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@conflict.example.com").await;
    let hour = create_service(&app, &shop_token, "Full Service", 60, 5000).await;
    let half = create_service(&app, &shop_token, "Trim", 30, 1500).await;
    let customer = register_customer(&app, "conflict-shop", "c@conflict.example.com").await;

    // 10:00-11:00, confirmed by the shop.
    let (status, first) = book(&app, &customer, &barber, &[hour.as_str()], "2030-06-16 10:00").await;
    assert_eq!(status, StatusCode::OK);
    let first_id = first["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/appointments/{first_id}/confirm"),
        Some(&shop_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 10:30-11:00 overlaps.
    let (status, body) = book(&app, &customer, &barber, &[half.as_str()], "2030-06-16 10:30").await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // 11:00-11:30 is back-to-back and fine.
    let (status, _) = book(&app, &customer, &barber, &[half.as_str()], "2030-06-16 11:00").await;
    assert_eq!(status, StatusCode::OK);

    // Cancelling the first frees the 10:30 slot.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/appointments/{first_id}/cancel"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = book(&app, &customer, &barber, &[half.as_str()], "2030-06-16 10:30").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_booking_outside_business_hours_rejected() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "hours-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@hours.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 60, 2500).await;
    let customer = register_customer(&app, "hours-shop", "c@hours.example.com").await;

    let (status, _) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 07:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Would end past closing.
    let (status, _) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 19:30").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inactive_barber_rejects_new_bookings() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "inactive-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@inactive.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer = register_customer(&app, "inactive-shop", "c@inactive.example.com").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/barbers/{barber}"),
        Some(&shop_token),
        Some(json!({ "active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 10:00").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_status_transitions_are_monotonic() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "transition-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@transition.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer = register_customer(&app, "transition-shop", "c@transition.example.com").await;

    let (_, appt) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 10:00").await;
    let id = appt["id"].as_str().unwrap();

    // Completing a pending appointment skips confirmation.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/complete"),
        Some(&shop_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, confirmed) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/confirm"),
        Some(&shop_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "confirmed");
    assert!(confirmed["confirmed_at"].is_string());

    let (status, completed) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/complete"),
        Some(&shop_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");

    // Completed is terminal: cancelling must be rejected.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/cancel"),
        Some(&shop_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
}

#[tokio::test]
async fn test_customer_may_cancel_but_not_confirm() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "perm-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@perm.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer = register_customer(&app, "perm-shop", "c@perm.example.com").await;

    let (_, appt) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 10:00").await;
    let id = appt["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/confirm"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cancelled) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/cancel"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert!(cancelled["cancelled_at"].is_string());
}

#[tokio::test]
async fn test_barber_confirms_own_appointments_only() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "barber-own").await;
    let barber_a = create_barber(&app, &shop_token, "Alice", "alice@own.example.com").await;
    create_barber(&app, &shop_token, "Bob", "bob@own.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer = register_customer(&app, "barber-own", "c@own.example.com").await;

    let (_, appt) = book(&app, &customer, &barber_a, &[service.as_str()], "2030-06-16 10:00").await;
    let id = appt["id"].as_str().unwrap();

    let (_, bob_login) = send(
        &app,
        "POST",
        "/api/auth/barber/login",
        None,
        Some(json!({ "email": "bob@own.example.com", "password": "barber-password" })),
    )
    .await;
    let bob_token = bob_login["token"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/confirm"),
        Some(bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, alice_login) = send(
        &app,
        "POST",
        "/api/auth/barber/login",
        None,
        Some(json!({ "email": "alice@own.example.com", "password": "barber-password" })),
    )
    .await;
    let alice_token = alice_login["token"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/confirm"),
        Some(alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_reschedule_checks_conflicts() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "resched-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@resched.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 60, 2500).await;
    let customer = register_customer(&app, "resched-shop", "c@resched.example.com").await;

    let (_, first) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 10:00").await;
    let (_, second) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 14:00").await;
    let second_id = second["id"].as_str().unwrap();

    // Moving the 14:00 booking onto the 10:00 one conflicts.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/appointments/{second_id}"),
        Some(&customer),
        Some(json!({ "start_time": "2030-06-16 10:30" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A free slot works, and the end time follows.
    let (status, moved) = send(
        &app,
        "PUT",
        &format!("/api/appointments/{second_id}"),
        Some(&customer),
        Some(json!({ "start_time": "2030-06-16 12:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["end_time"], "2030-06-16T13:00:00");

    // Sliding an appointment within its own window is allowed.
    let first_id = first["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/appointments/{first_id}"),
        Some(&customer),
        Some(json!({ "start_time": "2030-06-16 10:30" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cancelled_appointment_cannot_be_rescheduled() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "frozen-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@frozen.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer = register_customer(&app, "frozen-shop", "c@frozen.example.com").await;

    let (_, appt) = book(&app, &customer, &barber, &[service.as_str()], "2030-06-16 10:00").await;
    let id = appt["id"].as_str().unwrap();

    send(
        &app,
        "POST",
        &format!("/api/appointments/{id}/cancel"),
        Some(&customer),
        None,
    )
    .await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/appointments/{id}"),
        Some(&customer),
        Some(json!({ "start_time": "2030-06-16 12:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_customers_see_only_their_own_appointments() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "privacy-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@privacy.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer_a = register_customer(&app, "privacy-shop", "a@privacy.example.com").await;
    let customer_b = register_customer(&app, "privacy-shop", "b@privacy.example.com").await;

    book(&app, &customer_a, &barber, &[service.as_str()], "2030-06-16 10:00").await;
    book(&app, &customer_b, &barber, &[service.as_str()], "2030-06-16 11:00").await;

    let (status, list) = send(&app, "GET", "/api/appointments", Some(&customer_a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // The shop admin sees the whole book.
    let (status, list) = send(&app, "GET", "/api/appointments", Some(&shop_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);

    // And one customer cannot open another's appointment.
    let other_id = list.as_array().unwrap()[1]["id"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/appointments/{other_id}"),
        Some(&customer_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_shop_admin_books_on_behalf_of_customer() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "walkin-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@walkin.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;

    let (status, customer) = send(
        &app,
        "POST",
        "/api/customers",
        Some(&shop_token),
        Some(json!({
            "name": "Walk In",
            "email": "walkin@example.com",
            "password": "customer-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let customer_id = customer["id"].as_str().unwrap();

    // Missing customer_id is a field error for admins.
    let (status, body) = book(&app, &shop_token, &barber, &[service.as_str()], "2030-06-16 10:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, appt) = send(
        &app,
        "POST",
        "/api/appointments",
        Some(&shop_token),
        Some(json!({
            "barber_id": barber,
            "service_ids": [service],
            "start_time": "2030-06-16 10:00",
            "customer_id": customer_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(appt["customer_id"], *customer_id);
}

// ── Availability ──

#[tokio::test]
async fn test_availability_free_day_returns_full_grid() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "avail-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@avail.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let customer = register_customer(&app, "avail-shop", "c@avail.example.com").await;

    let (status, days) = send(
        &app,
        "GET",
        &format!("/api/availability?barber_id={barber}&from=2030-06-16&to=2030-06-16&service_ids={service}"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{days}");
    let slots = days[0]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 24);
    assert_eq!(slots[0], "08:00");
    assert_eq!(slots[23], "19:30");
}

#[tokio::test]
async fn test_availability_excludes_booked_slots() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "busy-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@busy.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;
    let hour = create_service(&app, &shop_token, "Full Service", 60, 5000).await;
    let customer = register_customer(&app, "busy-shop", "c@busy.example.com").await;

    book(&app, &customer, &barber, &[hour.as_str()], "2030-06-16 10:00").await;

    let (status, days) = send(
        &app,
        "GET",
        &format!("/api/availability?barber_id={barber}&from=2030-06-16&to=2030-06-16&service_ids={service}"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let slots: Vec<&str> = days[0]["slots"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap())
        .collect();

    assert!(!slots.contains(&"10:00"));
    assert!(!slots.contains(&"10:30"));
    assert!(slots.contains(&"09:30"));
    assert!(slots.contains(&"11:00"));
}

#[tokio::test]
async fn test_availability_fully_booked_day_is_empty() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "packed-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@packed.example.com").await;
    let half = create_service(&app, &shop_token, "Trim", 30, 1500).await;
    let marathon = create_service(&app, &shop_token, "All Day", 720, 100_000).await;
    let customer = register_customer(&app, "packed-shop", "c@packed.example.com").await;

    let (status, body) = book(&app, &customer, &barber, &[marathon.as_str()], "2030-06-16 08:00").await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, days) = send(
        &app,
        "GET",
        &format!("/api/availability?barber_id={barber}&from=2030-06-16&to=2030-06-16&service_ids={half}"),
        Some(&customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(days[0]["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_availability_validates_range() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "range-shop").await;
    let barber = create_barber(&app, &shop_token, "Alice", "alice@range.example.com").await;
    let service = create_service(&app, &shop_token, "Haircut", 30, 2500).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/availability?barber_id={barber}&from=2030-06-16&to=2030-06-10&service_ids={service}"),
        Some(&shop_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/availability?barber_id={barber}&from=2030-06-16&to=2030-12-31&service_ids={service}"),
        Some(&shop_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Barber multi-tenancy ──

#[tokio::test]
async fn test_barber_login_lists_memberships_and_switches() {
    let app = test_app();
    let (shop_a, token_a) = setup_shop(&app, "uptown").await;
    let (shop_b, token_b) = setup_shop(&app, "downtown").await;

    create_barber(&app, &token_a, "Alice", "alice@multi.example.com").await;
    create_barber(&app, &token_b, "Alice", "alice@multi.example.com").await;

    let (status, login) = send(
        &app,
        "POST",
        "/api/auth/barber/login",
        None,
        Some(json!({ "email": "alice@multi.example.com", "password": "barber-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{login}");
    assert_eq!(login["memberships"].as_array().unwrap().len(), 2);
    assert_eq!(login["barbershop_id"], shop_a["id"]);

    let (status, switched) = send(
        &app,
        "POST",
        "/api/auth/barber/switch",
        Some(login["token"].as_str().unwrap()),
        Some(json!({ "barbershop_id": shop_b["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{switched}");
    assert_eq!(switched["barbershop_id"], shop_b["id"]);

    // Switching into a shop where the barber has no account is refused.
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/barber/switch",
        Some(switched["token"].as_str().unwrap()),
        Some(json!({ "barbershop_id": "nonexistent-shop" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ── Landing pages ──

#[tokio::test]
async fn test_landing_publish_flow() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "fresh-cuts").await;
    create_service(&app, &shop_token, "Skin Fade", 45, 3500).await;

    // Unpublished pages are invisible.
    let (status, _) = send_raw(&app, "/p/fresh-cuts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, page) = send(
        &app,
        "PUT",
        "/api/landing",
        Some(&shop_token),
        Some(json!({
            "title": "Fresh Cuts & Co",
            "about": "Walk-ins welcome.",
            "theme_color": "#aa3322",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["published"], false);

    let (status, page) = send(&app, "POST", "/api/landing/publish", Some(&shop_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["published"], true);

    let (status, html) = send_raw(&app, "/p/fresh-cuts").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(html).unwrap();
    assert!(html.contains("Fresh Cuts &amp; Co"));
    assert!(html.contains("Walk-ins welcome."));
    assert!(html.contains("Skin Fade"));
    assert!(html.contains("$35.00"));

    let (status, _) = send(&app, "POST", "/api/landing/unpublish", Some(&shop_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_raw(&app, "/p/fresh-cuts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logo_upload_and_public_serving() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "logo-shop").await;

    // A minimal GIF header, base64-encoded.
    use base64::Engine;
    let pixel = base64::engine::general_purpose::STANDARD
        .encode([0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00]);

    let (status, page) = send(
        &app,
        "POST",
        "/api/landing/logo",
        Some(&shop_token),
        Some(json!({ "content_type": "image/gif", "data": pixel })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{page}");
    assert_eq!(page["has_logo"], true);

    // Not served until the page is published.
    let (status, _) = send_raw(&app, "/p/logo-shop/logo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, "POST", "/api/landing/publish", Some(&shop_token), None).await;

    let (status, bytes) = send_raw(&app, "/p/logo-shop/logo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"GIF"));
}

#[tokio::test]
async fn test_logo_upload_rejects_bad_payloads() {
    let app = test_app();
    let (_, shop_token) = setup_shop(&app, "strict-logo").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/landing/logo",
        Some(&shop_token),
        Some(json!({ "content_type": "text/html", "data": "PGI+" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/landing/logo",
        Some(&shop_token),
        Some(json!({ "content_type": "image/png", "data": "not base64 !!!" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_customer_register_duplicate_email_conflict() {
    let app = test_app();
    setup_shop(&app, "dup-shop").await;
    register_customer(&app, "dup-shop", "dup@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/customer/register",
        None,
        Some(json!({
            "slug": "dup-shop",
            "name": "Again",
            "email": "dup@example.com",
            "password": "customer-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

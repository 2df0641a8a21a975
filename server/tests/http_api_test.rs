//! End-to-end tests for the HTTP API over the in-memory backend.
//!
//! These drive the full router (extractors, handlers, error mapping)
//! with a controlled clock and a scripted external ledger.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Integration tests can use expect for setup

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use portgate_core::environment::Clock;
use portgate_core::{Engine, EngineStores, NotificationSink};
use portgate_server::{AppState, StorageBackend, build_router};
use portgate_testing::mocks::{
    FixedClock, LedgerMode, RecordingNotifier, ScriptedLedger, test_clock,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    clock: Arc<FixedClock>,
    notifier: Arc<RecordingNotifier>,
    ledger: Arc<ScriptedLedger>,
}

fn test_app(mode: LedgerMode) -> TestApp {
    let clock = test_clock();
    let notifier = Arc::new(RecordingNotifier::new());
    let ledger = Arc::new(ScriptedLedger::new(mode));
    let engine = Engine::new(
        EngineStores::in_memory(),
        Arc::clone(&clock) as Arc<dyn Clock>,
        Arc::clone(&notifier) as Arc<dyn NotificationSink>,
        Arc::clone(&ledger) as Arc<dyn portgate_core::LedgerClient>,
        Duration::from_millis(200),
    );
    let router = build_router(AppState::new(engine, StorageBackend::Memory));
    TestApp {
        router,
        clock,
        notifier,
        ledger,
    }
}

fn request(
    method: &str,
    uri: &str,
    actor: Option<(Uuid, &str)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((actor_id, role)) = actor {
        builder = builder
            .header("x-actor-id", actor_id.to_string())
            .header("x-actor-role", role);
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn window_start() -> DateTime<Utc> {
    // test_clock starts at 2026-01-01T00:00:00Z; the window opens there.
    test_clock().now()
}

async fn create_slot(app: &TestApp, capacity: u32) -> (Uuid, Uuid) {
    let gate_id = Uuid::new_v4();
    let operator = Uuid::new_v4();
    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/slots",
            Some((operator, "operator")),
            Some(json!({
                "gate_id": gate_id,
                "starts_at": window_start(),
                "ends_at": window_start() + ChronoDuration::hours(2),
                "max_capacity": capacity,
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "slot creation failed: {body}");
    let slot_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    (gate_id, slot_id)
}

fn booking_body(slot_id: Uuid) -> Value {
    json!({
        "slot_id": slot_id,
        "truck_id": Uuid::new_v4(),
        "truck_plate": "HH-PG 714",
        "carrier_id": Uuid::new_v4(),
        "driver_name": "Jonas Petersen",
        "driver_contact": "+49 40 555 0134",
        "driver_credential": "D-884213",
        "note": "reefer cargo",
    })
}

async fn create_booking(app: &TestApp, slot_id: Uuid) -> Uuid {
    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/bookings",
            Some((Uuid::new_v4(), "carrier")),
            Some(booking_body(slot_id)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "booking creation failed: {body}");
    assert_eq!(body["status"], "pending");
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn confirm(app: &TestApp, booking_id: Uuid) -> Value {
    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("/api/bookings/{booking_id}/status"),
            Some((Uuid::new_v4(), "operator")),
            Some(json!({"status": "confirmed"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "confirmation failed: {body}");
    body
}

#[tokio::test]
async fn full_booking_and_admission_flow() {
    let app = test_app(LedgerMode::Healthy);
    let (gate_id, slot_id) = create_slot(&app, 2).await;
    let booking_id = create_booking(&app, slot_id).await;

    let confirmed = confirm(&app, booking_id).await;
    assert_eq!(confirmed["status"], "confirmed");
    assert!(confirmed["proof_token"].is_string());

    // Inside the window: granted.
    app.clock.set(window_start() + ChronoDuration::minutes(30));
    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("/api/gates/{gate_id}/admissions"),
            Some((Uuid::new_v4(), "system")),
            Some(json!({"booking_id": booking_id})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "admission failed: {body}");
    assert_eq!(body["status"], "consumed");
    assert_eq!(body["truck_plate"], "HH-PG 714");

    // Replay: deterministically already-used.
    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("/api/gates/{gate_id}/admissions"),
            Some((Uuid::new_v4(), "system")),
            Some(json!({"booking_id": booking_id})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "DENIED_ALREADY_USED");

    // Slot occupancy was untouched by admission.
    let (status, body) = send(
        &app.router,
        request("GET", &format!("/api/slots/{slot_id}"), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_bookings"], 1);

    // Both notarization attempts were submitted to the ledger.
    for _ in 0..100 {
        if app.ledger.submissions().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(app.ledger.submissions().len(), 2);

    // The fan-out saw creation, confirmation, and admission.
    let events = app.notifier.wait_for(3).await;
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn full_slot_returns_conflict() {
    let app = test_app(LedgerMode::Healthy);
    let (_gate_id, slot_id) = create_slot(&app, 1).await;
    create_booking(&app, slot_id).await;

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            "/api/bookings",
            Some((Uuid::new_v4(), "carrier")),
            Some(booking_body(slot_id)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn invalid_transition_is_unprocessable() {
    let app = test_app(LedgerMode::Healthy);
    let (_gate_id, slot_id) = create_slot(&app, 1).await;
    let booking_id = create_booking(&app, slot_id).await;

    // Reject it, then try to confirm the terminal booking.
    let (status, _) = send(
        &app.router,
        request(
            "POST",
            &format!("/api/bookings/{booking_id}/status"),
            Some((Uuid::new_v4(), "operator")),
            Some(json!({"status": "rejected"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("/api/bookings/{booking_id}/status"),
            Some((Uuid::new_v4(), "operator")),
            Some(json!({"status": "confirmed"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_TRANSITION");

    // Rejection released the unit; the slot is bookable again.
    create_booking(&app, slot_id).await;
}

#[tokio::test]
async fn admission_outside_window_is_denied() {
    let app = test_app(LedgerMode::Healthy);
    let (gate_id, slot_id) = create_slot(&app, 1).await;
    let booking_id = create_booking(&app, slot_id).await;
    confirm(&app, booking_id).await;

    app.clock
        .set(window_start() + ChronoDuration::hours(2) + ChronoDuration::seconds(1));
    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("/api/gates/{gate_id}/admissions"),
            Some((Uuid::new_v4(), "system")),
            Some(json!({"booking_id": booking_id})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "DENIED_OUTSIDE_WINDOW");
}

#[tokio::test]
async fn unknown_booking_at_the_gate_is_not_found() {
    let app = test_app(LedgerMode::Healthy);
    let (gate_id, _slot_id) = create_slot(&app, 1).await;

    let (status, body) = send(
        &app.router,
        request(
            "POST",
            &format!("/api/gates/{gate_id}/admissions"),
            Some((Uuid::new_v4(), "system")),
            Some(json!({"booking_id": Uuid::new_v4()})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "DENIED_NOT_FOUND");
}

#[tokio::test]
async fn missing_identity_headers_are_rejected() {
    let app = test_app(LedgerMode::Healthy);
    let (_gate_id, slot_id) = create_slot(&app, 1).await;

    let (status, body) = send(
        &app.router,
        request("POST", "/api/bookings", None, Some(booking_body(slot_id))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unreachable_ledger_still_confirms_and_records_the_attempt() {
    let app = test_app(LedgerMode::Unreachable);
    let (_gate_id, slot_id) = create_slot(&app, 1).await;
    let booking_id = create_booking(&app, slot_id).await;

    let confirmed = confirm(&app, booking_id).await;
    assert_eq!(confirmed["status"], "confirmed");
    assert!(confirmed["proof_token"].is_string());

    // The degraded attempt is queryable shortly after.
    let mut records = Value::Null;
    for _ in 0..100 {
        let (status, body) = send(
            &app.router,
            request(
                "GET",
                &format!("/api/bookings/{booking_id}/notarizations"),
                None,
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        if body.as_array().is_some_and(|a| !a.is_empty()) {
            records = body;
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(records[0]["succeeded"], false);
    assert!(records[0]["receipt"].is_null());

    // The audit trail carries both the confirmation and the degradation.
    let (status, body) = send(
        &app.router,
        request(
            "GET",
            &format!("/api/bookings/{booking_id}/audit"),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert!(actions.contains(&"booking-created"));
    assert!(actions.contains(&"booking-confirmed"));
    assert!(actions.contains(&"notarization-failed"));
}

#[tokio::test]
async fn list_bookings_applies_the_filter() {
    let app = test_app(LedgerMode::Healthy);
    let (_gate_id, slot_id) = create_slot(&app, 3).await;
    for _ in 0..3 {
        create_booking(&app, slot_id).await;
    }

    let (status, body) = send(
        &app.router,
        request(
            "GET",
            &format!("/api/bookings?slot_id={slot_id}&status=pending"),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(
        &app.router,
        request(
            "GET",
            &format!("/api/bookings?slot_id={slot_id}&status=confirmed"),
            None,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

//! Router configuration for the PortGate server.

use crate::api::{admissions, bookings, slots};
use crate::health::{health_check, readiness_check};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health checks
/// - Slot configuration
/// - Booking lifecycle
/// - Gate admission
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Slot configuration (terminal staff)
        .route("/slots", post(slots::create_slot))
        .route("/slots/:id", get(slots::get_slot))
        .route("/gates/:gate_id/slots", get(slots::list_gate_slots))
        // Booking lifecycle
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings", get(bookings::list_bookings))
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/status", post(bookings::change_status))
        .route("/bookings/:id/audit", get(bookings::booking_audit))
        .route(
            "/bookings/:id/notarizations",
            get(bookings::booking_notarizations),
        )
        // Gate admission (the scanner)
        .route(
            "/gates/:gate_id/admissions",
            post(admissions::validate_entry),
        );

    Router::new()
        // Health checks (no identity headers)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // API routes under /api prefix
        .nest("/api", api_routes)
        .with_state(state)
}

//! Business metrics for the PortGate engine.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `portgate_bookings_total{status}` - Booking transitions by resulting status
//! - `portgate_admissions_total{outcome}` - Gate decisions (granted, or the denial reason)
//! - `portgate_capacity_rejections_total` - Reservation attempts refused for capacity

use metrics::{counter, describe_counter};

/// Initialize and register all business metrics descriptions.
///
/// Called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "portgate_bookings_total",
        "Booking transitions by resulting status (pending, confirmed, rejected, cancelled)"
    );
    describe_counter!(
        "portgate_admissions_total",
        "Gate admission decisions by outcome (granted, or the denial reason code)"
    );
    describe_counter!(
        "portgate_capacity_rejections_total",
        "Reservation attempts refused because the slot was full"
    );
}

/// Record a booking reaching `status`
pub fn booking(status: &'static str) {
    counter!("portgate_bookings_total", "status" => status).increment(1);
}

/// Record a gate decision
pub fn admission(outcome: &'static str) {
    counter!("portgate_admissions_total", "outcome" => outcome).increment(1);
}

/// Record a capacity rejection
pub fn capacity_rejection() {
    counter!("portgate_capacity_rejections_total").increment(1);
}

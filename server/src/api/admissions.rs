//! Gate admission endpoint (the hardware scanner).
//!
//! - `POST /api/gates/:gate_id/admissions` - Validate a truck arrival

use super::Caller;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use portgate_core::{AdmissionError, AdmissionSummary, BookingId, BookingStatus, GateId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request carrying the booking reference the scanner read.
#[derive(Debug, Deserialize)]
pub struct AdmissionBody {
    /// Booking reference presented at the gate
    pub booking_id: Uuid,
}

/// Summary returned when entry is granted.
#[derive(Debug, Serialize)]
pub struct AdmissionResponse {
    /// Admitted booking
    pub booking_id: Uuid,
    /// Truck registration plate
    pub truck_plate: String,
    /// Driver name
    pub driver_name: String,
    /// Gate
    pub gate_id: Uuid,
    /// Status after admission (always `consumed`)
    pub status: BookingStatus,
    /// Admission instant
    pub granted_at: DateTime<Utc>,
}

impl From<AdmissionSummary> for AdmissionResponse {
    fn from(summary: AdmissionSummary) -> Self {
        Self {
            booking_id: *summary.booking_id.as_uuid(),
            truck_plate: summary.truck_plate,
            driver_name: summary.driver_name,
            gate_id: *summary.gate_id.as_uuid(),
            status: summary.status,
            granted_at: summary.granted_at,
        }
    }
}

/// Decide whether the presenting truck may enter, consuming the booking
/// on success.
///
/// Denials come back as 403 (404 for an unknown reference) with a stable
/// `DENIED_*` code; a replayed admission is `DENIED_ALREADY_USED`.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn validate_entry(
    State(state): State<AppState>,
    Path(gate_id): Path<Uuid>,
    Caller(actor): Caller,
    Json(body): Json<AdmissionBody>,
) -> Result<Json<AdmissionResponse>, ApiError> {
    let summary = state
        .engine
        .validate_entry(
            GateId::from_uuid(gate_id),
            BookingId::from_uuid(body.booking_id),
            &actor,
        )
        .await
        .map_err(|err| {
            if let AdmissionError::Denied(reason) = &err {
                metrics::admission(reason.code());
            }
            ApiError::from(err)
        })?;
    metrics::admission("granted");
    Ok(Json(summary.into()))
}

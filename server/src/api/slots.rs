//! Slot configuration endpoints (terminal staff).
//!
//! - `POST /api/slots` - Configure a passage window at a gate
//! - `GET /api/slots/:id` - Fetch one slot with its occupancy
//! - `GET /api/gates/:gate_id/slots` - Every window configured for a gate

use super::Caller;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use portgate_core::{GateId, SlotId, TimeSlot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to configure a new slot.
#[derive(Debug, Deserialize)]
pub struct CreateSlotBody {
    /// Gate the window belongs to
    pub gate_id: Uuid,
    /// Window start (inclusive)
    pub starts_at: DateTime<Utc>,
    /// Window end (inclusive)
    pub ends_at: DateTime<Utc>,
    /// Maximum number of concurrent bookings
    pub max_capacity: u32,
}

/// Slot representation returned by the slot endpoints.
#[derive(Debug, Serialize)]
pub struct SlotResponse {
    /// Slot ID
    pub id: Uuid,
    /// Gate
    pub gate_id: Uuid,
    /// Window start
    pub starts_at: DateTime<Utc>,
    /// Window end
    pub ends_at: DateTime<Utc>,
    /// Maximum bookings
    pub max_capacity: u32,
    /// Live bookings
    pub current_bookings: u32,
    /// Remaining capacity
    pub remaining: u32,
}

impl From<TimeSlot> for SlotResponse {
    fn from(slot: TimeSlot) -> Self {
        Self {
            id: *slot.id.as_uuid(),
            gate_id: *slot.gate_id.as_uuid(),
            starts_at: slot.starts_at,
            ends_at: slot.ends_at,
            max_capacity: slot.max_capacity,
            current_bookings: slot.current_bookings,
            remaining: slot.remaining(),
        }
    }
}

/// Configure a new slot at a gate.
///
/// # Errors
///
/// Returns 400 for a non-positive capacity or inverted window.
pub async fn create_slot(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(body): Json<CreateSlotBody>,
) -> Result<(StatusCode, Json<SlotResponse>), ApiError> {
    let slot = state
        .engine
        .create_slot(
            GateId::from_uuid(body.gate_id),
            body.starts_at,
            body.ends_at,
            body.max_capacity,
            &actor,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(slot.into())))
}

/// Fetch one slot.
///
/// # Errors
///
/// Returns 404 when the slot does not exist.
pub async fn get_slot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SlotResponse>, ApiError> {
    let slot = state.engine.get_slot(SlotId::from_uuid(id)).await?;
    Ok(Json(slot.into()))
}

/// Every slot configured for a gate, ordered by window start.
///
/// # Errors
///
/// Returns 500 when the read fails.
pub async fn list_gate_slots(
    State(state): State<AppState>,
    Path(gate_id): Path<Uuid>,
) -> Result<Json<Vec<SlotResponse>>, ApiError> {
    let slots = state.engine.list_slots(GateId::from_uuid(gate_id)).await?;
    Ok(Json(slots.into_iter().map(Into::into).collect()))
}

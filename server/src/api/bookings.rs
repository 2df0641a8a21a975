//! Booking management endpoints.
//!
//! - `POST /api/bookings` - Create a booking (status `pending`)
//! - `GET /api/bookings/:id` - Fetch one booking
//! - `GET /api/bookings` - List bookings (filter query params)
//! - `POST /api/bookings/:id/status` - Confirm, reject, or cancel
//! - `GET /api/bookings/:id/audit` - Audit trail for one booking
//! - `GET /api/bookings/:id/notarizations` - Notarization attempts

use super::Caller;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use portgate_core::{
    AuditEntry, AuditQuery, Booking, BookingFilter, BookingId, BookingStatus, CarrierId,
    CreateBookingRequest, DriverInfo, EngineError, NotarizationRecord, SlotId, TruckId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to create a new booking.
#[derive(Debug, Deserialize)]
pub struct CreateBookingBody {
    /// Slot to reserve
    pub slot_id: Uuid,
    /// Truck performing the passage
    pub truck_id: Uuid,
    /// Truck registration plate
    pub truck_plate: String,
    /// Carrier the truck belongs to
    pub carrier_id: Uuid,
    /// Driver full name
    pub driver_name: String,
    /// Driver contact channel
    pub driver_contact: String,
    /// Driver credential presented at the gate
    pub driver_credential: String,
    /// Optional free-text note
    pub note: Option<String>,
}

/// Booking representation returned by every booking endpoint.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    /// Booking ID
    pub id: Uuid,
    /// Current status
    pub status: BookingStatus,
    /// Reserved slot
    pub slot_id: Uuid,
    /// Truck
    pub truck_id: Uuid,
    /// Truck registration plate
    pub truck_plate: String,
    /// Carrier
    pub carrier_id: Uuid,
    /// Requesting principal
    pub requested_by: Uuid,
    /// Driver name
    pub driver_name: String,
    /// One-time admission proof token (present once confirmed)
    pub proof_token: Option<Uuid>,
    /// Optional note
    pub note: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last status-change timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: *booking.id.as_uuid(),
            status: booking.status,
            slot_id: *booking.slot_id.as_uuid(),
            truck_id: *booking.truck_id.as_uuid(),
            truck_plate: booking.truck_plate,
            carrier_id: *booking.carrier_id.as_uuid(),
            requested_by: *booking.requested_by.as_uuid(),
            driver_name: booking.driver.name,
            proof_token: booking.proof_token.map(|token| *token.as_uuid()),
            note: booking.note,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Request to change a booking's status.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusBody {
    /// Target status: `confirmed`, `rejected`, or `cancelled`
    pub status: BookingStatus,
}

/// Filter query parameters for the booking list.
#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsParams {
    /// Only bookings requested by this principal
    pub requested_by: Option<Uuid>,
    /// Only bookings for this carrier
    pub carrier_id: Option<Uuid>,
    /// Only bookings against this slot
    pub slot_id: Option<Uuid>,
    /// Only bookings in this status
    pub status: Option<BookingStatus>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new booking against a slot with free capacity.
///
/// Returns 201 with the pending booking, 409 when the slot is full, or
/// 400 for a malformed request.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn create_booking(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Json(body): Json<CreateBookingBody>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    let request = CreateBookingRequest {
        slot_id: SlotId::from_uuid(body.slot_id),
        truck_id: TruckId::from_uuid(body.truck_id),
        truck_plate: body.truck_plate,
        carrier_id: CarrierId::from_uuid(body.carrier_id),
        driver: DriverInfo::new(body.driver_name, body.driver_contact, body.driver_credential),
        note: body.note,
    };
    let booking = state
        .engine
        .create_booking(request, &actor)
        .await
        .map_err(|err| {
            if err == EngineError::CapacityExceeded {
                metrics::capacity_rejection();
            }
            ApiError::from(err)
        })?;
    metrics::booking("pending");
    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// Fetch one booking.
///
/// # Errors
///
/// Returns 404 when the booking does not exist.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state.engine.get_booking(BookingId::from_uuid(id)).await?;
    Ok(Json(booking.into()))
}

/// List bookings matching the query filter. Scope narrowing (own bookings
/// vs. all) is the upstream gateway's concern; this endpoint applies the
/// filter it is handed.
///
/// # Errors
///
/// Returns 500 when the read fails.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(params): Query<ListBookingsParams>,
) -> Result<Json<Vec<BookingResponse>>, ApiError> {
    let filter = BookingFilter {
        requested_by: params.requested_by.map(portgate_core::ActorId::from_uuid),
        carrier_id: params.carrier_id.map(CarrierId::from_uuid),
        slot_id: params.slot_id.map(SlotId::from_uuid),
        status: params.status,
    };
    let bookings = state.engine.list_bookings(&filter).await?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

/// Confirm, reject, or cancel a booking.
///
/// Returns the updated booking (with a proof token when confirming), 422
/// for a transition outside the state machine, or 404 for an unknown
/// booking.
///
/// # Errors
///
/// See [`ApiError`].
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Caller(actor): Caller,
    Json(body): Json<ChangeStatusBody>,
) -> Result<Json<BookingResponse>, ApiError> {
    let booking = state
        .engine
        .change_booking_status(BookingId::from_uuid(id), body.status, &actor)
        .await?;
    metrics::booking(booking.status.as_str());
    Ok(Json(booking.into()))
}

/// Audit trail for one booking, oldest first.
///
/// # Errors
///
/// Returns 500 when the read fails.
pub async fn booking_audit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    let entries = state.engine.audit_trail(&AuditQuery::for_subject(id)).await?;
    Ok(Json(entries))
}

/// Notarization attempts recorded for one booking, oldest first.
///
/// # Errors
///
/// Returns 500 when the read fails.
pub async fn booking_notarizations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<NotarizationRecord>>, ApiError> {
    let records = state.engine.notarization_attempts(id).await?;
    Ok(Json(records))
}

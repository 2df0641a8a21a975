//! Repository traits over the backing store.
//!
//! The engine needs a handful of narrow operations, not ORM semantics:
//! insert, point reads, filtered lists, append, and two *conditional*
//! updates. The conditional updates (capacity reserve and the booking
//! status compare-and-swap) are the concurrency-critical pieces and must
//! be a single atomic step inside the implementation, never a
//! read-modify-write above it.

use crate::error::StoreError;
use crate::types::{
    AuditEntry, AuditQuery, Booking, BookingFilter, BookingId, BookingStatus, GateId,
    NotarizationRecord, ProofToken, SlotId, TimeSlot,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage for time slots and their occupancy counters
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Persist a newly configured slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the write fails.
    async fn insert(&self, slot: TimeSlot) -> Result<(), StoreError>;

    /// Fetch a slot by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the slot does not exist.
    async fn get(&self, slot_id: SlotId) -> Result<TimeSlot, StoreError>;

    /// List every slot configured for a gate, ordered by window start.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the read fails.
    async fn list_for_gate(&self, gate_id: GateId) -> Result<Vec<TimeSlot>, StoreError>;

    /// Atomically reserve one unit of capacity.
    ///
    /// The check `current_bookings < max_capacity` and the increment happen
    /// in one conditional step; when many callers race for the last unit,
    /// exactly one wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityExhausted`] when the slot is full and
    /// [`StoreError::NotFound`] when it does not exist.
    async fn reserve(&self, slot_id: SlotId) -> Result<(), StoreError>;

    /// Atomically release one unit of capacity, floored at zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the slot does not exist.
    async fn release(&self, slot_id: SlotId) -> Result<(), StoreError>;
}

/// Storage for bookings
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a new booking.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the write fails.
    async fn insert(&self, booking: Booking) -> Result<(), StoreError>;

    /// Fetch a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the booking does not exist.
    async fn get(&self, booking_id: BookingId) -> Result<Booking, StoreError>;

    /// List bookings matching `filter`, ordered by creation time ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the read fails.
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, StoreError>;

    /// Compare-and-swap the booking status.
    ///
    /// Moves the booking from `expected` to `next` (setting `proof_token`
    /// when given, and `updated_at`) in one conditional step, and returns
    /// the booking as written. Of any number of concurrent callers with the
    /// same `expected`, exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StatusConflict`] with the observed status when
    /// the booking is not in `expected`, and [`StoreError::NotFound`] when
    /// it does not exist.
    async fn transition_if(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        next: BookingStatus,
        proof_token: Option<ProofToken>,
        updated_at: DateTime<Utc>,
    ) -> Result<Booking, StoreError>;
}

/// Append-only storage for the audit trail
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one entry. Entries are never mutated or deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the write fails.
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError>;

    /// Entries matching `query`, ordered by `recorded_at` ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the read fails.
    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, StoreError>;
}

/// Storage for notarization attempt records
#[async_trait]
pub trait NotarizationStore: Send + Sync {
    /// Record one notarization attempt (successful or degraded).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the write fails.
    async fn record(&self, record: NotarizationRecord) -> Result<(), StoreError>;

    /// Every attempt recorded for a subject, ordered by `attempted_at`
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the read fails.
    async fn list_for_subject(&self, subject_id: Uuid)
    -> Result<Vec<NotarizationRecord>, StoreError>;
}

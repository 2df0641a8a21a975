//! In-memory repository implementations.
//!
//! Used by tests and single-node deployments. The conditional operations
//! run entirely under the map's mutex, so they are the same single atomic
//! step the Postgres backend expresses as a conditional `UPDATE`.

use crate::error::StoreError;
use crate::store::{AuditStore, BookingStore, NotarizationStore, SlotStore};
use crate::types::{
    AuditEntry, AuditQuery, Booking, BookingFilter, BookingId, BookingStatus, GateId,
    NotarizationRecord, ProofToken, SlotId, TimeSlot,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned lock only means another caller panicked mid-operation;
    // the data itself is a plain map and stays usable.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory slot store
#[derive(Debug, Default)]
pub struct InMemorySlotStore {
    slots: Mutex<HashMap<SlotId, TimeSlot>>,
}

impl InMemorySlotStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn insert(&self, slot: TimeSlot) -> Result<(), StoreError> {
        locked(&self.slots).insert(slot.id, slot);
        Ok(())
    }

    async fn get(&self, slot_id: SlotId) -> Result<TimeSlot, StoreError> {
        locked(&self.slots)
            .get(&slot_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_for_gate(&self, gate_id: GateId) -> Result<Vec<TimeSlot>, StoreError> {
        let mut slots: Vec<TimeSlot> = locked(&self.slots)
            .values()
            .filter(|slot| slot.gate_id == gate_id)
            .cloned()
            .collect();
        slots.sort_by_key(|slot| slot.starts_at);
        Ok(slots)
    }

    async fn reserve(&self, slot_id: SlotId) -> Result<(), StoreError> {
        let mut slots = locked(&self.slots);
        let slot = slots.get_mut(&slot_id).ok_or(StoreError::NotFound)?;
        if slot.current_bookings >= slot.max_capacity {
            return Err(StoreError::CapacityExhausted);
        }
        slot.current_bookings += 1;
        Ok(())
    }

    async fn release(&self, slot_id: SlotId) -> Result<(), StoreError> {
        let mut slots = locked(&self.slots);
        let slot = slots.get_mut(&slot_id).ok_or(StoreError::NotFound)?;
        slot.current_bookings = slot.current_bookings.saturating_sub(1);
        Ok(())
    }
}

/// In-memory booking store
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    bookings: Mutex<HashMap<BookingId, Booking>>,
}

impl InMemoryBookingStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        locked(&self.bookings).insert(booking.id, booking);
        Ok(())
    }

    async fn get(&self, booking_id: BookingId) -> Result<Booking, StoreError> {
        locked(&self.bookings)
            .get(&booking_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> = locked(&self.bookings)
            .values()
            .filter(|booking| filter.matches(booking))
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| booking.created_at);
        Ok(bookings)
    }

    async fn transition_if(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        next: BookingStatus,
        proof_token: Option<ProofToken>,
        updated_at: DateTime<Utc>,
    ) -> Result<Booking, StoreError> {
        let mut bookings = locked(&self.bookings);
        let booking = bookings.get_mut(&booking_id).ok_or(StoreError::NotFound)?;
        if booking.status != expected {
            return Err(StoreError::StatusConflict {
                actual: booking.status,
            });
        }
        booking.status = next;
        if proof_token.is_some() {
            booking.proof_token = proof_token;
        }
        booking.updated_at = updated_at;
        Ok(booking.clone())
    }
}

/// In-memory audit store
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        locked(&self.entries).push(entry);
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, StoreError> {
        let mut entries: Vec<AuditEntry> = locked(&self.entries)
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.recorded_at);
        Ok(entries)
    }
}

/// In-memory notarization record store
#[derive(Debug, Default)]
pub struct InMemoryNotarizationStore {
    records: Mutex<Vec<NotarizationRecord>>,
}

impl InMemoryNotarizationStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotarizationStore for InMemoryNotarizationStore {
    async fn record(&self, record: NotarizationRecord) -> Result<(), StoreError> {
        locked(&self.records).push(record);
        Ok(())
    }

    async fn list_for_subject(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<NotarizationRecord>, StoreError> {
        let mut records: Vec<NotarizationRecord> = locked(&self.records)
            .iter()
            .filter(|record| record.subject_id == subject_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.attempted_at);
        Ok(records)
    }
}

//! Capacity ledger: the slot-occupancy invariant under concurrency.
//!
//! The ledger knows nothing about booking identities, only occupancy. Both
//! operations delegate to the store's conditional updates, so the
//! check-and-increment is one atomic step regardless of backend. There is
//! no read-then-write race window at this layer to begin with.

use crate::error::EngineError;
use crate::store::SlotStore;
use crate::types::{SlotId, TimeSlot};
use std::sync::Arc;

/// Tracks reserved vs. maximum capacity per time window
#[derive(Clone)]
pub struct CapacityLedger {
    slots: Arc<dyn SlotStore>,
}

impl CapacityLedger {
    /// Creates a ledger over `slots`
    #[must_use]
    pub fn new(slots: Arc<dyn SlotStore>) -> Self {
        Self { slots }
    }

    /// Fetch a slot by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the slot does not exist.
    pub async fn slot(&self, slot_id: SlotId) -> Result<TimeSlot, EngineError> {
        Ok(self.slots.get(slot_id).await?)
    }

    /// Atomically take one unit of capacity. When many callers race for
    /// the last unit, exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CapacityExceeded`] when the slot is already
    /// at `max_capacity` (the caller must not create a booking in that
    /// case) and [`EngineError::NotFound`] for an unknown slot.
    pub async fn reserve(&self, slot_id: SlotId) -> Result<(), EngineError> {
        self.slots.reserve(slot_id).await?;
        tracing::debug!(%slot_id, "capacity reserved");
        Ok(())
    }

    /// Atomically return one unit of capacity, floored at zero. Called
    /// when a pending or confirmed booking becomes rejected or cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown slot.
    pub async fn release(&self, slot_id: SlotId) -> Result<(), EngineError> {
        self.slots.release(slot_id).await?;
        tracing::debug!(%slot_id, "capacity released");
        Ok(())
    }
}

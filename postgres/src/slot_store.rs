//! `PostgreSQL` slot store: occupancy lives in a single row per slot and
//! is only ever written through conditional `UPDATE`s.

use crate::{backend_err, to_i32, to_u32};
use async_trait::async_trait;
use portgate_core::store::SlotStore;
use portgate_core::{GateId, SlotId, StoreError, TimeSlot};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct SlotRow {
    id: Uuid,
    gate_id: Uuid,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    max_capacity: i32,
    current_bookings: i32,
}

impl SlotRow {
    fn into_slot(self) -> Result<TimeSlot, StoreError> {
        Ok(TimeSlot {
            id: SlotId::from_uuid(self.id),
            gate_id: GateId::from_uuid(self.gate_id),
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            max_capacity: to_u32(self.max_capacity)?,
            current_bookings: to_u32(self.current_bookings)?,
        })
    }
}

const SLOT_COLUMNS: &str = "id, gate_id, starts_at, ends_at, max_capacity, current_bookings";

/// Slot repository backed by the `time_slots` table
#[derive(Clone)]
pub struct PostgresSlotStore {
    pool: Arc<PgPool>,
}

impl PostgresSlotStore {
    /// Creates a store over `pool`
    #[must_use]
    pub const fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlotStore for PostgresSlotStore {
    async fn insert(&self, slot: TimeSlot) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO time_slots (id, gate_id, starts_at, ends_at, max_capacity, current_bookings)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(slot.id.as_uuid())
        .bind(slot.gate_id.as_uuid())
        .bind(slot.starts_at)
        .bind(slot.ends_at)
        .bind(to_i32(slot.max_capacity)?)
        .bind(to_i32(slot.current_bookings)?)
        .execute(self.pool.as_ref())
        .await
        .map_err(backend_err)?;
        Ok(())
    }

    async fn get(&self, slot_id: SlotId) -> Result<TimeSlot, StoreError> {
        let row: Option<SlotRow> =
            sqlx::query_as(&format!("SELECT {SLOT_COLUMNS} FROM time_slots WHERE id = $1"))
                .bind(slot_id.as_uuid())
                .fetch_optional(self.pool.as_ref())
                .await
                .map_err(backend_err)?;
        row.ok_or(StoreError::NotFound)?.into_slot()
    }

    async fn list_for_gate(&self, gate_id: GateId) -> Result<Vec<TimeSlot>, StoreError> {
        let rows: Vec<SlotRow> = sqlx::query_as(&format!(
            "SELECT {SLOT_COLUMNS} FROM time_slots WHERE gate_id = $1 ORDER BY starts_at"
        ))
        .bind(gate_id.as_uuid())
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(backend_err)?;
        rows.into_iter().map(SlotRow::into_slot).collect()
    }

    async fn reserve(&self, slot_id: SlotId) -> Result<(), StoreError> {
        // Condition and increment in one statement: when several callers
        // race for the last unit, the row lock serializes them and only
        // one sees the predicate still true.
        let result = sqlx::query(
            "UPDATE time_slots
             SET current_bookings = current_bookings + 1
             WHERE id = $1 AND current_bookings < max_capacity",
        )
        .bind(slot_id.as_uuid())
        .execute(self.pool.as_ref())
        .await
        .map_err(backend_err)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Zero rows: either the slot is full or it does not exist.
        let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM time_slots WHERE id = $1")
            .bind(slot_id.as_uuid())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(backend_err)?;
        match exists {
            Some(_) => Err(StoreError::CapacityExhausted),
            None => Err(StoreError::NotFound),
        }
    }

    async fn release(&self, slot_id: SlotId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE time_slots
             SET current_bookings = current_bookings - 1
             WHERE id = $1 AND current_bookings > 0",
        )
        .bind(slot_id.as_uuid())
        .execute(self.pool.as_ref())
        .await
        .map_err(backend_err)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Zero rows: already at zero (fine, release floors there) or the
        // slot is unknown.
        let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM time_slots WHERE id = $1")
            .bind(slot_id.as_uuid())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(backend_err)?;
        match exists {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

//! `PostgreSQL` booking store. The status compare-and-swap is a single
//! conditional `UPDATE ... RETURNING`, so two concurrent writers with the
//! same expectation can never both commit.

use crate::backend_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portgate_core::store::BookingStore;
use portgate_core::{
    ActorId, Booking, BookingFilter, BookingId, BookingStatus, CarrierId, DriverInfo, ProofToken,
    SlotId, StoreError, TruckId,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    status: String,
    slot_id: Uuid,
    truck_id: Uuid,
    truck_plate: String,
    carrier_id: Uuid,
    requested_by: Uuid,
    driver_name: String,
    driver_contact: String,
    driver_credential: String,
    proof_token: Option<Uuid>,
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, StoreError> {
        let status: BookingStatus = self
            .status
            .parse()
            .map_err(|e: String| StoreError::Backend(e))?;
        Ok(Booking {
            id: BookingId::from_uuid(self.id),
            status,
            slot_id: SlotId::from_uuid(self.slot_id),
            truck_id: TruckId::from_uuid(self.truck_id),
            truck_plate: self.truck_plate,
            carrier_id: CarrierId::from_uuid(self.carrier_id),
            requested_by: ActorId::from_uuid(self.requested_by),
            driver: DriverInfo::new(self.driver_name, self.driver_contact, self.driver_credential),
            proof_token: self.proof_token.map(ProofToken::from_uuid),
            note: self.note,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, status, slot_id, truck_id, truck_plate, carrier_id, \
     requested_by, driver_name, driver_contact, driver_credential, proof_token, note, \
     created_at, updated_at";

/// Booking repository backed by the `bookings` table
#[derive(Clone)]
pub struct PostgresBookingStore {
    pool: Arc<PgPool>,
}

impl PostgresBookingStore {
    /// Creates a store over `pool`
    #[must_use]
    pub const fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PostgresBookingStore {
    async fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO bookings (id, status, slot_id, truck_id, truck_plate, carrier_id,
                 requested_by, driver_name, driver_contact, driver_credential, proof_token,
                 note, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.status.as_str())
        .bind(booking.slot_id.as_uuid())
        .bind(booking.truck_id.as_uuid())
        .bind(&booking.truck_plate)
        .bind(booking.carrier_id.as_uuid())
        .bind(booking.requested_by.as_uuid())
        .bind(&booking.driver.name)
        .bind(&booking.driver.contact)
        .bind(&booking.driver.credential)
        .bind(booking.proof_token.as_ref().map(ProofToken::as_uuid))
        .bind(&booking.note)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(backend_err)?;
        Ok(())
    }

    async fn get(&self, booking_id: BookingId) -> Result<Booking, StoreError> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
                .bind(booking_id.as_uuid())
                .fetch_optional(self.pool.as_ref())
                .await
                .map_err(backend_err)?;
        row.ok_or(StoreError::NotFound)?.into_booking()
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, StoreError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1 = 1"));
        if let Some(requested_by) = filter.requested_by {
            builder.push(" AND requested_by = ");
            builder.push_bind(*requested_by.as_uuid());
        }
        if let Some(carrier_id) = filter.carrier_id {
            builder.push(" AND carrier_id = ");
            builder.push_bind(*carrier_id.as_uuid());
        }
        if let Some(slot_id) = filter.slot_id {
            builder.push(" AND slot_id = ");
            builder.push_bind(*slot_id.as_uuid());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at");

        let rows: Vec<BookingRow> = builder
            .build_query_as()
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(backend_err)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn transition_if(
        &self,
        booking_id: BookingId,
        expected: BookingStatus,
        next: BookingStatus,
        proof_token: Option<ProofToken>,
        updated_at: DateTime<Utc>,
    ) -> Result<Booking, StoreError> {
        // The WHERE clause carries the expectation; losers of a race see
        // zero rows and report the status that actually won.
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "UPDATE bookings
             SET status = $3, proof_token = COALESCE($4, proof_token), updated_at = $5
             WHERE id = $1 AND status = $2
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id.as_uuid())
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(proof_token.as_ref().map(ProofToken::as_uuid))
        .bind(updated_at)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(backend_err)?;

        if let Some(row) = row {
            return row.into_booking();
        }

        let actual: Option<(String,)> = sqlx::query_as("SELECT status FROM bookings WHERE id = $1")
            .bind(booking_id.as_uuid())
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(backend_err)?;
        match actual {
            Some((status,)) => Err(StoreError::StatusConflict {
                actual: status.parse().map_err(|e: String| StoreError::Backend(e))?,
            }),
            None => Err(StoreError::NotFound),
        }
    }
}

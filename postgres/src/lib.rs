//! `PostgreSQL` repositories for the PortGate engine.
//!
//! Implements the `portgate-core` store traits on top of `sqlx`. The two
//! concurrency-critical operations are expressed as single conditional
//! `UPDATE ... WHERE` statements, so the check and the write happen in one
//! atomic step inside the database:
//!
//! - capacity reserve: `UPDATE time_slots SET current_bookings =
//!   current_bookings + 1 WHERE id = $1 AND current_bookings <
//!   max_capacity`
//! - status compare-and-swap: `UPDATE bookings SET status = $3 ... WHERE
//!   id = $1 AND status = $2 RETURNING ...`
//!
//! Neither ever degenerates into an application-level read-modify-write.

mod audit_store;
mod booking_store;
mod notarization_store;
mod slot_store;

pub use audit_store::PostgresAuditStore;
pub use booking_store::PostgresBookingStore;
pub use notarization_store::PostgresNotarizationStore;
pub use slot_store::PostgresSlotStore;

use portgate_core::StoreError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout: u64,
    /// Idle timeout in seconds
    pub idle_timeout: u64,
}

impl PoolSettings {
    /// Settings with the pool sized for a single engine process
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: 16,
            min_connections: 1,
            connect_timeout: 5,
            idle_timeout: 300,
        }
    }
}

/// Open a connection pool with the given settings.
///
/// # Errors
///
/// Returns [`StoreError::Backend`] when the database is unreachable.
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout))
        .idle_timeout(Duration::from_secs(settings.idle_timeout))
        .connect(&settings.url)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to connect: {e}")))
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns [`StoreError::Backend`] when a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))
}

pub(crate) fn backend_err(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

pub(crate) fn to_u32(value: i32) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Backend(format!("negative counter: {value}")))
}

pub(crate) fn to_i32(value: u32) -> Result<i32, StoreError> {
    i32::try_from(value).map_err(|_| StoreError::Backend(format!("counter overflow: {value}")))
}

//! Application state for the PortGate HTTP server.

use crate::config::{Config, StorageBackend};
use crate::ledger::{DisabledLedger, HttpLedgerClient};
use anyhow::{Context, Result};
use portgate_core::environment::SystemClock;
use portgate_core::{Engine, EngineStores, LedgerClient, NullNotifier};
use portgate_postgres::{
    PoolSettings, PostgresAuditStore, PostgresBookingStore, PostgresNotarizationStore,
    PostgresSlotStore, connect, run_migrations,
};
use std::sync::Arc;
use std::time::Duration;

/// State shared across all HTTP handlers. Cloned (cheaply via `Arc`) per
/// request.
#[derive(Clone)]
pub struct AppState {
    /// The booking and gate-admission engine
    pub engine: Engine,
    /// Which backend the engine runs on, for the readiness probe
    pub backend: StorageBackend,
}

impl AppState {
    /// Build the engine from configuration: storage backend, ledger
    /// client, and clock.
    ///
    /// # Errors
    ///
    /// Returns an error when the Postgres backend is selected and the
    /// database is unreachable or the migrations fail.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let stores = match config.storage.backend {
            StorageBackend::Memory => EngineStores::in_memory(),
            StorageBackend::Postgres => {
                let url = config
                    .storage
                    .database_url
                    .clone()
                    .context("postgres backend requires DATABASE_URL")?;
                let settings = PoolSettings {
                    url,
                    max_connections: config.storage.max_connections,
                    min_connections: config.storage.min_connections,
                    connect_timeout: config.storage.connect_timeout,
                    idle_timeout: config.storage.idle_timeout,
                };
                let pool = Arc::new(connect(&settings).await?);
                run_migrations(&pool).await?;
                EngineStores {
                    slots: Arc::new(PostgresSlotStore::new(Arc::clone(&pool))),
                    bookings: Arc::new(PostgresBookingStore::new(Arc::clone(&pool))),
                    audits: Arc::new(PostgresAuditStore::new(Arc::clone(&pool))),
                    notarizations: Arc::new(PostgresNotarizationStore::new(pool)),
                }
            }
        };

        let timeout = Duration::from_millis(config.notary.timeout_ms);
        let ledger: Arc<dyn LedgerClient> = match &config.notary.ledger_url {
            Some(url) => Arc::new(HttpLedgerClient::new(url.clone(), timeout)?),
            None => {
                tracing::warn!("no ledger endpoint configured; notarization runs degraded");
                Arc::new(DisabledLedger)
            }
        };

        let engine = Engine::new(
            stores,
            Arc::new(SystemClock),
            Arc::new(NullNotifier),
            ledger,
            timeout,
        );
        Ok(Self {
            engine,
            backend: config.storage.backend,
        })
    }

    /// State over an existing engine (used by tests)
    #[must_use]
    pub const fn new(engine: Engine, backend: StorageBackend) -> Self {
        Self { engine, backend }
    }
}

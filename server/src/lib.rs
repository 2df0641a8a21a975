//! # PortGate Server
//!
//! HTTP facade and composition root for the PortGate booking and
//! gate-admission engine. The engine itself lives in `portgate-core`;
//! this crate adds configuration, storage selection (in-memory or
//! Postgres), the external ledger client, Prometheus metrics, and the
//! Axum router exposing the three logical operations:
//!
//! - create booking (`POST /api/bookings`)
//! - change booking status (`POST /api/bookings/:id/status`)
//! - validate gate entry (`POST /api/gates/:gate_id/admissions`)

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod ledger;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::{Config, StorageBackend};
pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

//! # PortGate Core
//!
//! Booking and gate-admission engine for a port gate appointment network.
//!
//! Carriers reserve truck-passage windows at physical gates, terminal
//! staff approve or reject them, and a gate scanner admits or denies
//! trucks at arrival time. This crate holds the parts with real
//! invariants:
//!
//! - **[`capacity::CapacityLedger`]**: slot occupancy, enforced with a
//!   single conditional update so concurrent reservations cannot oversell
//!   a window.
//! - **[`lifecycle::BookingLifecycleManager`]**: the booking state
//!   machine (`Pending → Confirmed → Consumed`, with `Rejected` and
//!   `Cancelled` terminals) and its capacity side effects, including the
//!   compensating release when persistence fails after a reservation.
//! - **[`admission::GateAdmissionValidator`]**: single-use gate
//!   admission via a compare-and-swap, so a replayed or concurrent
//!   duplicate arrival is deterministically denied.
//! - **[`notary::NotarizationPipeline`]**: best-effort, never-blocking
//!   anchoring of confirmed events on an external immutable ledger,
//!   degrading to the audit trail when the ledger is unreachable.
//! - **[`audit::AuditTrail`]**: append-only record of every
//!   state-changing action; the durable source of truth.
//!
//! Storage sits behind the narrow repository traits in [`store`], with
//! in-memory implementations in [`memory`] and a Postgres backend in the
//! `portgate-postgres` crate. Identity is resolved upstream and injected
//! as [`types::ActorContext`]; the engine never authenticates.

pub mod admission;
pub mod audit;
pub mod capacity;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod notary;
pub mod notify;
pub mod store;
pub mod types;

/// Dependency-injection traits for ambient facilities
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

pub use admission::GateAdmissionValidator;
pub use audit::AuditTrail;
pub use capacity::CapacityLedger;
pub use engine::{Engine, EngineStores};
pub use error::{AdmissionError, DeniedReason, EngineError, LedgerError, NotifyError, StoreError};
pub use lifecycle::BookingLifecycleManager;
pub use notary::{LedgerClient, NotarizationPipeline, NotaryPayload, PassageKind, content_hash};
pub use notify::{NotificationSink, Notifier, NullNotifier};
pub use types::{
    ActorContext, ActorId, AdmissionSummary, AuditAction, AuditEntry, AuditQuery, Booking,
    BookingFilter, BookingId, BookingStatus, CarrierId, CreateBookingRequest, DriverInfo,
    EngineEvent, EventKind, GateId, LedgerReceipt, NotarizationRecord, ProofToken, Role, SlotId,
    SubjectType, TimeSlot, TruckId,
};

//! Error taxonomy for the engine.
//!
//! Capacity and state-machine violations surface synchronously as typed
//! results. Ledger and notification failures are internal: they are logged
//! and recorded but never fail the caller's primary operation.

use crate::types::BookingStatus;
use thiserror::Error;

/// Storage-layer errors returned by the repository traits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The slot is already at `max_capacity`
    #[error("slot is at maximum capacity")]
    CapacityExhausted,

    /// The requested entity does not exist
    #[error("entity not found")]
    NotFound,

    /// A conditional status update lost to a concurrent writer
    #[error("status conflict: booking is {actual}")]
    StatusConflict {
        /// Status actually observed by the store
        actual: BookingStatus,
    },

    /// The backing store failed
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// User-facing engine errors for the booking operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The slot is full; retryable against another slot
    #[error("slot capacity exceeded")]
    CapacityExceeded,

    /// The requested transition is outside the state machine; not retryable
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        /// Status the booking was in
        from: BookingStatus,
        /// Status that was requested
        to: BookingStatus,
    },

    /// Booking or slot unknown
    #[error("not found")]
    NotFound,

    /// The request failed validation before touching any state
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backing store failed
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CapacityExhausted => Self::CapacityExceeded,
            StoreError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}

/// Reason a gate admission attempt was denied.
///
/// `AlreadyUsed` is deliberately distinct from both `NotFound` and
/// `WrongState` so the gate operator can tell a replayed pass from a bad
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeniedReason {
    /// No booking with the presented reference exists
    #[error("booking not found")]
    NotFound,

    /// The booking exists but is not admissible in its current status
    #[error("booking is {0}, not confirmed")]
    WrongState(BookingStatus),

    /// The booking's slot belongs to a different gate
    #[error("booking is not valid for this gate")]
    WrongGate,

    /// The current time is outside the booked window
    #[error("arrival is outside the booked window")]
    OutsideWindow,

    /// The booking was already admitted once
    #[error("booking was already used")]
    AlreadyUsed,
}

impl DeniedReason {
    /// Stable kebab-case code for wire responses and audit details
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::WrongState(_) => "wrong-state",
            Self::WrongGate => "wrong-gate",
            Self::OutsideWindow => "outside-window",
            Self::AlreadyUsed => "already-used",
        }
    }
}

/// Outcome of a failed gate admission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Entry was denied for a policy reason
    #[error("admission denied: {0}")]
    Denied(DeniedReason),

    /// The backing store failed before a decision could be made
    #[error("storage error: {0}")]
    Storage(StoreError),
}

/// Failures of the external immutable ledger.
///
/// These never propagate to the operation that triggered notarization; the
/// audit trail remains the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger endpoint could not be reached
    #[error("ledger unreachable: {0}")]
    Unavailable(String),

    /// The bounded submission window elapsed
    #[error("ledger write timed out")]
    Timeout,

    /// The ledger answered but refused the hash
    #[error("ledger rejected the hash: {0}")]
    Rejected(String),
}

/// Failure to deliver a fire-and-forget notification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    /// Delivery to the sink failed
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

//! Composition root for the engine.
//!
//! [`Engine`] wires the stores and collaborators into the three logical
//! operations (create booking, change status, validate entry) plus slot
//! configuration and the read surfaces. Transports stay outside; the HTTP
//! facade and tests both consume this one handle.

use crate::admission::GateAdmissionValidator;
use crate::audit::AuditTrail;
use crate::capacity::CapacityLedger;
use crate::environment::Clock;
use crate::error::{AdmissionError, EngineError};
use crate::lifecycle::BookingLifecycleManager;
use crate::memory::{
    InMemoryAuditStore, InMemoryBookingStore, InMemoryNotarizationStore, InMemorySlotStore,
};
use crate::notary::{LedgerClient, NotarizationPipeline};
use crate::notify::{NotificationSink, Notifier};
use crate::store::{AuditStore, BookingStore, NotarizationStore, SlotStore};
use crate::types::{
    ActorContext, AdmissionSummary, AuditAction, AuditEntry, AuditQuery, Booking, BookingFilter,
    BookingId, BookingStatus, CreateBookingRequest, GateId, NotarizationRecord, SlotId,
    SubjectType, TimeSlot,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Backing stores handed to [`Engine::new`]
pub struct EngineStores {
    /// Slot storage
    pub slots: Arc<dyn SlotStore>,
    /// Booking storage
    pub bookings: Arc<dyn BookingStore>,
    /// Audit trail storage
    pub audits: Arc<dyn AuditStore>,
    /// Notarization record storage
    pub notarizations: Arc<dyn NotarizationStore>,
}

impl EngineStores {
    /// In-memory stores for tests and single-node deployments
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            slots: Arc::new(InMemorySlotStore::new()),
            bookings: Arc::new(InMemoryBookingStore::new()),
            audits: Arc::new(InMemoryAuditStore::new()),
            notarizations: Arc::new(InMemoryNotarizationStore::new()),
        }
    }
}

/// The booking and gate-admission engine
#[derive(Clone)]
pub struct Engine {
    capacity: CapacityLedger,
    lifecycle: BookingLifecycleManager,
    admission: GateAdmissionValidator,
    notary: NotarizationPipeline,
    audit: AuditTrail,
    slots: Arc<dyn SlotStore>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Wires an engine over the given stores and collaborators.
    ///
    /// `ledger_timeout` bounds every external notarization write.
    #[must_use]
    pub fn new(
        stores: EngineStores,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
        ledger: Arc<dyn LedgerClient>,
        ledger_timeout: Duration,
    ) -> Self {
        let capacity = CapacityLedger::new(Arc::clone(&stores.slots));
        let audit = AuditTrail::new(Arc::clone(&stores.audits), Arc::clone(&clock));
        let notifier = Notifier::new(sink);
        let notary = NotarizationPipeline::new(
            Arc::clone(&stores.notarizations),
            ledger,
            audit.clone(),
            Arc::clone(&clock),
            ledger_timeout,
        );
        let lifecycle = BookingLifecycleManager::new(
            Arc::clone(&stores.bookings),
            capacity.clone(),
            audit.clone(),
            notifier.clone(),
            notary.clone(),
            Arc::clone(&clock),
        );
        let admission = GateAdmissionValidator::new(
            Arc::clone(&stores.bookings),
            Arc::clone(&stores.slots),
            audit.clone(),
            notifier,
            notary.clone(),
            Arc::clone(&clock),
        );
        Self {
            capacity,
            lifecycle,
            admission,
            notary,
            audit,
            slots: stores.slots,
            clock,
        }
    }

    /// Configure a new slot at a gate.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a non-positive capacity or
    /// an inverted window, and [`EngineError::Storage`] if the write
    /// fails.
    pub async fn create_slot(
        &self,
        gate_id: GateId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        max_capacity: u32,
        actor: &ActorContext,
    ) -> Result<TimeSlot, EngineError> {
        if max_capacity == 0 {
            return Err(EngineError::Validation(
                "slot capacity must be positive".to_string(),
            ));
        }
        if ends_at <= starts_at {
            return Err(EngineError::Validation(
                "slot window must end after it starts".to_string(),
            ));
        }

        let slot = TimeSlot::new(gate_id, starts_at, ends_at, max_capacity);
        self.slots.insert(slot.clone()).await?;
        tracing::info!(slot_id = %slot.id, %gate_id, max_capacity, "slot configured");
        self.audit
            .record(
                actor,
                AuditAction::SlotCreated,
                SubjectType::Slot,
                *slot.id.as_uuid(),
                serde_json::json!({
                    "gate_id": gate_id,
                    "starts_at": starts_at,
                    "ends_at": ends_at,
                    "max_capacity": max_capacity,
                }),
            )
            .await;
        Ok(slot)
    }

    /// Fetch a slot by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the slot does not exist.
    pub async fn get_slot(&self, slot_id: SlotId) -> Result<TimeSlot, EngineError> {
        self.capacity.slot(slot_id).await
    }

    /// Every slot configured for a gate, ordered by window start.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the read fails.
    pub async fn list_slots(&self, gate_id: GateId) -> Result<Vec<TimeSlot>, EngineError> {
        Ok(self.slots.list_for_gate(gate_id).await?)
    }

    /// Create a booking (status `Pending`) against a slot with free
    /// capacity. See [`BookingLifecycleManager::create`].
    ///
    /// # Errors
    ///
    /// Propagates the lifecycle manager's typed errors.
    pub async fn create_booking(
        &self,
        request: CreateBookingRequest,
        actor: &ActorContext,
    ) -> Result<Booking, EngineError> {
        self.lifecycle.create(request, actor).await
    }

    /// Move a booking to `Confirmed`, `Rejected`, or `Cancelled`. See
    /// [`BookingLifecycleManager::change_status`].
    ///
    /// # Errors
    ///
    /// Propagates the lifecycle manager's typed errors.
    pub async fn change_booking_status(
        &self,
        booking_id: BookingId,
        target: BookingStatus,
        actor: &ActorContext,
    ) -> Result<Booking, EngineError> {
        self.lifecycle.change_status(booking_id, target, actor).await
    }

    /// Fetch a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the booking does not exist.
    pub async fn get_booking(&self, booking_id: BookingId) -> Result<Booking, EngineError> {
        self.lifecycle.get(booking_id).await
    }

    /// List bookings matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the read fails.
    pub async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, EngineError> {
        self.lifecycle.list(filter).await
    }

    /// Decide a gate arrival. See
    /// [`GateAdmissionValidator::validate_entry`].
    ///
    /// # Errors
    ///
    /// Propagates the validator's [`AdmissionError`].
    pub async fn validate_entry(
        &self,
        gate_id: GateId,
        booking_id: BookingId,
        actor: &ActorContext,
    ) -> Result<AdmissionSummary, AdmissionError> {
        self.admission.validate_entry(gate_id, booking_id, actor).await
    }

    /// Audit entries matching `query`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the read fails.
    pub async fn audit_trail(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, EngineError> {
        self.audit.query(query).await
    }

    /// Notarization attempts recorded for a subject, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the read fails.
    pub async fn notarization_attempts(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<NotarizationRecord>, EngineError> {
        self.notary.attempts(subject_id).await
    }

    /// The engine's clock (shared with the collaborators)
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

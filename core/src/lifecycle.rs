//! Booking lifecycle: creation and the status state machine.
//!
//! Creation is a two-step logical transaction: reserve capacity first,
//! persist the booking second, and compensate with a release if the second
//! step fails. That compensation is the single most important invariant in
//! this module: a reserved unit with no booking behind it would leak
//! capacity forever.
//!
//! Status changes are compare-and-swaps against the store, so two
//! operators racing to decide the same pending booking cannot both win.

use crate::audit::AuditTrail;
use crate::capacity::CapacityLedger;
use crate::environment::Clock;
use crate::error::{EngineError, StoreError};
use crate::notary::{NotaryPayload, NotarizationPipeline, PassageKind};
use crate::notify::Notifier;
use crate::store::BookingStore;
use crate::types::{
    ActorContext, AuditAction, Booking, BookingFilter, BookingId, BookingStatus,
    CreateBookingRequest, EngineEvent, EventKind, ProofToken, SubjectType,
};
use std::sync::Arc;

/// Owns the booking state machine and its capacity side effects
#[derive(Clone)]
pub struct BookingLifecycleManager {
    bookings: Arc<dyn BookingStore>,
    capacity: CapacityLedger,
    audit: AuditTrail,
    notifier: Notifier,
    notary: NotarizationPipeline,
    clock: Arc<dyn Clock>,
}

impl BookingLifecycleManager {
    /// Creates a lifecycle manager over the given stores and collaborators
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        capacity: CapacityLedger,
        audit: AuditTrail,
        notifier: Notifier,
        notary: NotarizationPipeline,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            capacity,
            audit,
            notifier,
            notary,
            clock,
        }
    }

    fn validate(request: &CreateBookingRequest) -> Result<(), EngineError> {
        if request.driver.name.trim().is_empty() {
            return Err(EngineError::Validation("driver name is required".to_string()));
        }
        if request.driver.credential.trim().is_empty() {
            return Err(EngineError::Validation(
                "driver credential is required".to_string(),
            ));
        }
        if request.truck_plate.trim().is_empty() {
            return Err(EngineError::Validation("truck plate is required".to_string()));
        }
        Ok(())
    }

    /// Create a booking in `Pending` against a slot with free capacity.
    ///
    /// Capacity is reserved before the booking is persisted; if
    /// persistence fails the reservation is rolled back so the two steps
    /// behave as one transaction.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] for a malformed request, an unknown
    ///   slot, or a slot whose window is already over;
    /// - [`EngineError::CapacityExceeded`] when the slot is full;
    /// - [`EngineError::Storage`] when persistence fails (the reserved
    ///   unit has been released again).
    pub async fn create(
        &self,
        request: CreateBookingRequest,
        actor: &ActorContext,
    ) -> Result<Booking, EngineError> {
        Self::validate(&request)?;

        let slot = self.capacity.slot(request.slot_id).await.map_err(|err| {
            match err {
                EngineError::NotFound => EngineError::Validation("unknown slot".to_string()),
                other => other,
            }
        })?;
        if slot.window_closed_at(self.clock.now()) {
            return Err(EngineError::Validation(
                "slot window is already over".to_string(),
            ));
        }

        self.capacity.reserve(request.slot_id).await?;

        let booking = Booking::new(request, actor.actor_id, self.clock.now());
        if let Err(err) = self.bookings.insert(booking.clone()).await {
            // Compensating release: the reservation and the insert are one
            // logical transaction.
            if let Err(release_err) = self.capacity.release(booking.slot_id).await {
                tracing::error!(slot_id = %booking.slot_id, error = %release_err,
                    "compensating release failed; slot counter is now inconsistent");
            }
            return Err(err.into());
        }

        tracing::info!(booking_id = %booking.id, slot_id = %booking.slot_id,
            carrier_id = %booking.carrier_id, "booking created");
        self.audit
            .record(
                actor,
                AuditAction::BookingCreated,
                SubjectType::Booking,
                *booking.id.as_uuid(),
                serde_json::json!({
                    "slot_id": booking.slot_id,
                    "truck_id": booking.truck_id,
                    "truck_plate": booking.truck_plate,
                    "carrier_id": booking.carrier_id,
                }),
            )
            .await;
        self.notifier.dispatch(EngineEvent::new(
            EventKind::BookingCreated,
            serde_json::json!({"booking_id": booking.id, "slot_id": booking.slot_id}),
        ));

        Ok(booking)
    }

    /// Move a booking to `Confirmed`, `Rejected`, or `Cancelled`.
    ///
    /// Confirmation assigns a one-time proof token and triggers
    /// notarization asynchronously; rejection and cancellation release the
    /// reserved capacity. Every transition writes one audit entry and
    /// notifies the dispatcher; neither side effect can fail the
    /// transition.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] when `target` is not an
    ///   operator-reachable status (`Consumed` belongs to gate admission);
    /// - [`EngineError::NotFound`] for an unknown booking;
    /// - [`EngineError::InvalidTransition`] when the state table forbids
    ///   the move (the booking is left unchanged).
    pub async fn change_status(
        &self,
        booking_id: BookingId,
        target: BookingStatus,
        actor: &ActorContext,
    ) -> Result<Booking, EngineError> {
        if !matches!(
            target,
            BookingStatus::Confirmed | BookingStatus::Rejected | BookingStatus::Cancelled
        ) {
            return Err(EngineError::Validation(format!(
                "status {target} cannot be requested directly"
            )));
        }

        let current = self.bookings.get(booking_id).await?;
        if !current.status.can_transition_to(target) {
            return Err(EngineError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let proof_token =
            (target == BookingStatus::Confirmed).then(ProofToken::new);
        let booking = match self
            .bookings
            .transition_if(booking_id, current.status, target, proof_token, self.clock.now())
            .await
        {
            Ok(booking) => booking,
            // A concurrent writer moved the booking between our read and
            // the CAS; report the transition against what is actually there.
            Err(StoreError::StatusConflict { actual }) => {
                return Err(EngineError::InvalidTransition {
                    from: actual,
                    to: target,
                });
            }
            Err(other) => return Err(other.into()),
        };

        tracing::info!(booking_id = %booking.id, from = %current.status, to = %target,
            "booking status changed");

        match target {
            BookingStatus::Rejected | BookingStatus::Cancelled => {
                if let Err(err) = self.capacity.release(booking.slot_id).await {
                    tracing::error!(slot_id = %booking.slot_id, error = %err,
                        "capacity release after terminal transition failed");
                }
            }
            BookingStatus::Confirmed => {
                if let Ok(slot) = self.capacity.slot(booking.slot_id).await {
                    self.notary.notarize(NotaryPayload {
                        subject_id: *booking.id.as_uuid(),
                        kind: PassageKind::Confirmation,
                        truck_plate: booking.truck_plate.clone(),
                        gate_id: slot.gate_id,
                        proof_token: booking.proof_token,
                        occurred_at: booking.updated_at,
                    });
                }
            }
            _ => {}
        }

        let (action, event_kind) = match target {
            BookingStatus::Confirmed => (AuditAction::BookingConfirmed, EventKind::BookingConfirmed),
            BookingStatus::Rejected => (AuditAction::BookingRejected, EventKind::BookingRejected),
            _ => (AuditAction::BookingCancelled, EventKind::BookingCancelled),
        };
        self.audit
            .record(
                actor,
                action,
                SubjectType::Booking,
                *booking.id.as_uuid(),
                serde_json::json!({"from": current.status, "to": target}),
            )
            .await;
        self.notifier.dispatch(EngineEvent::new(
            event_kind,
            serde_json::json!({"booking_id": booking.id, "status": target}),
        ));

        Ok(booking)
    }

    /// Fetch a booking by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the booking does not exist.
    pub async fn get(&self, booking_id: BookingId) -> Result<Booking, EngineError> {
        Ok(self.bookings.get(booking_id).await?)
    }

    /// List bookings matching `filter`. Scope narrowing by role is the
    /// caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the read fails.
    pub async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, EngineError> {
        Ok(self.bookings.list(filter).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::environment::SystemClock;
    use crate::memory::{
        InMemoryAuditStore, InMemoryBookingStore, InMemoryNotarizationStore, InMemorySlotStore,
    };
    use crate::notary::LedgerClient;
    use crate::notify::NullNotifier;
    use crate::store::SlotStore;
    use crate::types::{
        ActorId, AuditQuery, CarrierId, DriverInfo, GateId, LedgerReceipt, Role, SlotId, TimeSlot,
        TruckId,
    };
    use crate::error::LedgerError;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::time::Duration;

    struct OkLedger;

    #[async_trait]
    impl LedgerClient for OkLedger {
        async fn submit(&self, content_hash: &str) -> Result<LedgerReceipt, LedgerError> {
            Ok(LedgerReceipt {
                reference: format!("anchor:{content_hash}"),
                recorded_at: Utc::now(),
            })
        }
    }

    struct Fixture {
        manager: BookingLifecycleManager,
        slots: Arc<InMemorySlotStore>,
        audit: AuditTrail,
        slot_id: SlotId,
        gate_id: GateId,
    }

    async fn fixture(capacity: u32) -> Fixture {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let slots = Arc::new(InMemorySlotStore::new());
        let gate_id = GateId::new();
        let start = Utc::now() - ChronoDuration::minutes(5);
        let slot = TimeSlot::new(gate_id, start, start + ChronoDuration::hours(2), capacity);
        let slot_id = slot.id;
        slots.insert(slot).await.unwrap();

        let audit = AuditTrail::new(Arc::new(InMemoryAuditStore::new()), Arc::clone(&clock));
        let notary = NotarizationPipeline::new(
            Arc::new(InMemoryNotarizationStore::new()),
            Arc::new(OkLedger),
            audit.clone(),
            Arc::clone(&clock),
            Duration::from_millis(200),
        );
        let manager = BookingLifecycleManager::new(
            Arc::new(InMemoryBookingStore::new()),
            CapacityLedger::new(Arc::clone(&slots) as Arc<dyn SlotStore>),
            audit.clone(),
            Notifier::new(Arc::new(NullNotifier)),
            notary,
            clock,
        );
        Fixture {
            manager,
            slots,
            audit,
            slot_id,
            gate_id,
        }
    }

    fn request(slot_id: SlotId) -> CreateBookingRequest {
        CreateBookingRequest {
            slot_id,
            truck_id: TruckId::new(),
            truck_plate: "HH-PG 714".to_string(),
            carrier_id: CarrierId::new(),
            driver: DriverInfo::new(
                "Jonas Petersen".to_string(),
                "+49 40 555 0134".to_string(),
                "D-884213".to_string(),
            ),
            note: None,
        }
    }

    fn carrier() -> ActorContext {
        ActorContext::new(ActorId::new(), Role::Carrier)
    }

    fn operator() -> ActorContext {
        ActorContext::new(ActorId::new(), Role::Operator)
    }

    #[tokio::test]
    async fn create_reserves_capacity_and_starts_pending() {
        let fx = fixture(2).await;

        let booking = fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.proof_token.is_none());

        let slot = fx.slots.get(fx.slot_id).await.unwrap();
        assert_eq!(slot.current_bookings, 1);
    }

    #[tokio::test]
    async fn create_on_full_slot_is_capacity_exceeded() {
        let fx = fixture(1).await;

        fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();
        let err = fx
            .manager
            .create(request(fx.slot_id), &carrier())
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::CapacityExceeded);

        let slot = fx.slots.get(fx.slot_id).await.unwrap();
        assert_eq!(slot.current_bookings, 1);
    }

    #[tokio::test]
    async fn create_rejects_blank_driver_without_touching_capacity() {
        let fx = fixture(1).await;

        let mut bad = request(fx.slot_id);
        bad.driver.name = "  ".to_string();
        let err = fx.manager.create(bad, &carrier()).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        assert_eq!(fx.slots.get(fx.slot_id).await.unwrap().current_bookings, 0);
    }

    #[tokio::test]
    async fn create_rejects_closed_window() {
        let fx = fixture(1).await;
        let gone = TimeSlot::new(
            fx.gate_id,
            Utc::now() - ChronoDuration::hours(3),
            Utc::now() - ChronoDuration::hours(2),
            1,
        );
        let gone_id = gone.id;
        fx.slots.insert(gone).await.unwrap();

        let err = fx
            .manager
            .create(request(gone_id), &carrier())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn confirm_assigns_proof_token() {
        let fx = fixture(1).await;
        let booking = fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();

        let confirmed = fx
            .manager
            .change_status(booking.id, BookingStatus::Confirmed, &operator())
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(confirmed.proof_token.is_some());

        // Capacity stays held by a confirmed booking.
        assert_eq!(fx.slots.get(fx.slot_id).await.unwrap().current_bookings, 1);
    }

    #[tokio::test]
    async fn reject_releases_capacity() {
        let fx = fixture(1).await;
        let booking = fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();

        fx.manager
            .change_status(booking.id, BookingStatus::Rejected, &operator())
            .await
            .unwrap();
        assert_eq!(fx.slots.get(fx.slot_id).await.unwrap().current_bookings, 0);

        // Terminal: no way back.
        let err = fx
            .manager
            .change_status(booking.id, BookingStatus::Confirmed, &operator())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                from: BookingStatus::Rejected,
                to: BookingStatus::Confirmed,
            }
        );
    }

    #[tokio::test]
    async fn cancel_after_confirm_releases_capacity() {
        let fx = fixture(1).await;
        let booking = fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();

        fx.manager
            .change_status(booking.id, BookingStatus::Confirmed, &operator())
            .await
            .unwrap();
        fx.manager
            .change_status(booking.id, BookingStatus::Cancelled, &operator())
            .await
            .unwrap();
        assert_eq!(fx.slots.get(fx.slot_id).await.unwrap().current_bookings, 0);
    }

    #[tokio::test]
    async fn consumed_cannot_be_requested_directly() {
        let fx = fixture(1).await;
        let booking = fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();

        let err = fx
            .manager
            .change_status(booking.id, BookingStatus::Consumed, &operator())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_booking_is_not_found() {
        let fx = fixture(1).await;
        let err = fx
            .manager
            .change_status(BookingId::new(), BookingStatus::Confirmed, &operator())
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::NotFound);
    }

    #[tokio::test]
    async fn every_transition_is_audited() {
        let fx = fixture(1).await;
        let booking = fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();
        fx.manager
            .change_status(booking.id, BookingStatus::Confirmed, &operator())
            .await
            .unwrap();

        let entries = fx
            .audit
            .query(&AuditQuery::for_subject(*booking.id.as_uuid()))
            .await
            .unwrap();
        let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        assert!(actions.contains(&AuditAction::BookingCreated));
        assert!(actions.contains(&AuditAction::BookingConfirmed));
    }

    #[tokio::test]
    async fn reserve_then_reject_repeatedly_is_net_zero() {
        let fx = fixture(4).await;

        for _ in 0..4 {
            let booking = fx.manager.create(request(fx.slot_id), &carrier()).await.unwrap();
            fx.manager
                .change_status(booking.id, BookingStatus::Rejected, &operator())
                .await
                .unwrap();
        }
        assert_eq!(fx.slots.get(fx.slot_id).await.unwrap().current_bookings, 0);
    }

    #[tokio::test]
    async fn insert_failure_rolls_back_reservation() {
        use crate::error::StoreError;
        use crate::types::{Booking, BookingFilter, ProofToken};
        use chrono::{DateTime, Utc as UtcTz};

        struct RefusingBookingStore;

        #[async_trait]
        impl BookingStore for RefusingBookingStore {
            async fn insert(&self, _booking: Booking) -> Result<(), StoreError> {
                Err(StoreError::Backend("write refused".to_string()))
            }

            async fn get(&self, _id: BookingId) -> Result<Booking, StoreError> {
                Err(StoreError::NotFound)
            }

            async fn list(&self, _filter: &BookingFilter) -> Result<Vec<Booking>, StoreError> {
                Ok(Vec::new())
            }

            async fn transition_if(
                &self,
                _id: BookingId,
                _expected: BookingStatus,
                _next: BookingStatus,
                _proof_token: Option<ProofToken>,
                _updated_at: DateTime<UtcTz>,
            ) -> Result<Booking, StoreError> {
                Err(StoreError::NotFound)
            }
        }

        let fx = fixture(1).await;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let notary = NotarizationPipeline::new(
            Arc::new(InMemoryNotarizationStore::new()),
            Arc::new(OkLedger),
            fx.audit.clone(),
            Arc::clone(&clock),
            Duration::from_millis(200),
        );
        let failing = BookingLifecycleManager::new(
            Arc::new(RefusingBookingStore),
            CapacityLedger::new(Arc::clone(&fx.slots) as Arc<dyn SlotStore>),
            fx.audit.clone(),
            Notifier::new(Arc::new(NullNotifier)),
            notary,
            clock,
        );

        let err = failing.create(request(fx.slot_id), &carrier()).await.unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)));

        // The reserved unit was handed back.
        assert_eq!(fx.slots.get(fx.slot_id).await.unwrap().current_bookings, 0);
    }
}

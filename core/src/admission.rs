//! Gate admission: the one-shot decision to let a truck through.
//!
//! The checks run in a fixed order (existence, status, gate, window) and
//! the grant itself is a compare-and-swap `Confirmed → Consumed`. The CAS
//! is the correctness core: when the scanner or the network replays a
//! request, or two lanes race on the same booking, exactly one attempt
//! wins and every other caller deterministically sees `AlreadyUsed`.
//! Admission never touches slot capacity.

use crate::audit::AuditTrail;
use crate::environment::Clock;
use crate::error::{AdmissionError, DeniedReason, StoreError};
use crate::notary::{NotaryPayload, NotarizationPipeline, PassageKind};
use crate::notify::Notifier;
use crate::store::{BookingStore, SlotStore};
use crate::types::{
    ActorContext, AdmissionSummary, AuditAction, BookingId, BookingStatus, EngineEvent, EventKind,
    GateId, SubjectType,
};
use std::sync::Arc;

/// Validates physical arrivals against bookings and performs the single
/// admission transition
#[derive(Clone)]
pub struct GateAdmissionValidator {
    bookings: Arc<dyn BookingStore>,
    slots: Arc<dyn SlotStore>,
    audit: AuditTrail,
    notifier: Notifier,
    notary: NotarizationPipeline,
    clock: Arc<dyn Clock>,
}

impl GateAdmissionValidator {
    /// Creates a validator over the given stores and collaborators
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        slots: Arc<dyn SlotStore>,
        audit: AuditTrail,
        notifier: Notifier,
        notary: NotarizationPipeline,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            slots,
            audit,
            notifier,
            notary,
            clock,
        }
    }

    async fn deny(
        &self,
        reason: DeniedReason,
        gate_id: GateId,
        booking_id: BookingId,
        actor: &ActorContext,
    ) -> AdmissionError {
        tracing::info!(%gate_id, %booking_id, reason = reason.code(), "gate admission denied");
        self.audit
            .record(
                actor,
                AuditAction::AdmissionDenied,
                SubjectType::Booking,
                *booking_id.as_uuid(),
                serde_json::json!({"gate_id": gate_id, "reason": reason.code()}),
            )
            .await;
        AdmissionError::Denied(reason)
    }

    /// Decide whether the truck presenting `booking_id` at `gate_id` may
    /// enter, and consume the booking if so.
    ///
    /// # Errors
    ///
    /// [`AdmissionError::Denied`] with the applicable [`DeniedReason`]:
    /// `NotFound` for an unknown reference, `WrongState` for a booking
    /// that is not confirmed, `AlreadyUsed` for one already admitted
    /// (including the loser of a concurrent duplicate), `WrongGate` when
    /// the slot belongs to another gate, and `OutsideWindow` when the
    /// arrival is outside the closed interval `[starts_at, ends_at]`.
    /// [`AdmissionError::Storage`] when the backing store fails.
    pub async fn validate_entry(
        &self,
        gate_id: GateId,
        booking_id: BookingId,
        actor: &ActorContext,
    ) -> Result<AdmissionSummary, AdmissionError> {
        let booking = match self.bookings.get(booking_id).await {
            Ok(booking) => booking,
            Err(StoreError::NotFound) => {
                return Err(self
                    .deny(DeniedReason::NotFound, gate_id, booking_id, actor)
                    .await);
            }
            Err(other) => return Err(AdmissionError::Storage(other)),
        };

        match booking.status {
            BookingStatus::Confirmed => {}
            BookingStatus::Consumed => {
                return Err(self
                    .deny(DeniedReason::AlreadyUsed, gate_id, booking_id, actor)
                    .await);
            }
            status => {
                return Err(self
                    .deny(DeniedReason::WrongState(status), gate_id, booking_id, actor)
                    .await);
            }
        }

        let slot = self
            .slots
            .get(booking.slot_id)
            .await
            .map_err(AdmissionError::Storage)?;
        if slot.gate_id != gate_id {
            return Err(self
                .deny(DeniedReason::WrongGate, gate_id, booking_id, actor)
                .await);
        }

        let now = self.clock.now();
        if !slot.window_contains(now) {
            return Err(self
                .deny(DeniedReason::OutsideWindow, gate_id, booking_id, actor)
                .await);
        }

        // The one-shot step. Whoever loses this CAS sees the booking
        // already consumed.
        let booking = match self
            .bookings
            .transition_if(
                booking_id,
                BookingStatus::Confirmed,
                BookingStatus::Consumed,
                None,
                now,
            )
            .await
        {
            Ok(booking) => booking,
            Err(StoreError::StatusConflict {
                actual: BookingStatus::Consumed,
            }) => {
                return Err(self
                    .deny(DeniedReason::AlreadyUsed, gate_id, booking_id, actor)
                    .await);
            }
            Err(StoreError::StatusConflict { actual }) => {
                return Err(self
                    .deny(DeniedReason::WrongState(actual), gate_id, booking_id, actor)
                    .await);
            }
            Err(other) => return Err(AdmissionError::Storage(other)),
        };

        tracing::info!(%gate_id, %booking_id, plate = %booking.truck_plate,
            "gate admission granted");
        self.notary.notarize(NotaryPayload {
            subject_id: *booking.id.as_uuid(),
            kind: PassageKind::GateAdmission,
            truck_plate: booking.truck_plate.clone(),
            gate_id,
            proof_token: booking.proof_token,
            occurred_at: now,
        });
        self.audit
            .record(
                actor,
                AuditAction::AdmissionGranted,
                SubjectType::Booking,
                *booking.id.as_uuid(),
                serde_json::json!({
                    "gate_id": gate_id,
                    "truck_id": booking.truck_id,
                    "truck_plate": booking.truck_plate,
                }),
            )
            .await;
        self.notifier.dispatch(EngineEvent::new(
            EventKind::GateAdmissionGranted,
            serde_json::json!({"booking_id": booking.id, "gate_id": gate_id}),
        ));

        Ok(AdmissionSummary {
            booking_id: booking.id,
            truck_plate: booking.truck_plate.clone(),
            driver_name: booking.driver.name.clone(),
            gate_id,
            status: booking.status,
            granted_at: now,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::capacity::CapacityLedger;
    use crate::environment::SystemClock;
    use crate::error::LedgerError;
    use crate::lifecycle::BookingLifecycleManager;
    use crate::memory::{
        InMemoryAuditStore, InMemoryBookingStore, InMemoryNotarizationStore, InMemorySlotStore,
    };
    use crate::notary::LedgerClient;
    use crate::notify::NullNotifier;
    use crate::types::{
        ActorId, AuditQuery, Booking, CarrierId, CreateBookingRequest, DriverInfo, LedgerReceipt,
        Role, SlotId, TimeSlot, TruckId,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
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
        validator: GateAdmissionValidator,
        manager: BookingLifecycleManager,
        slots: Arc<InMemorySlotStore>,
        audit: AuditTrail,
        gate_id: GateId,
        slot_id: SlotId,
    }

    async fn fixture_with_window(
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Fixture {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let slots = Arc::new(InMemorySlotStore::new());
        let bookings = Arc::new(InMemoryBookingStore::new());
        let gate_id = GateId::new();
        let slot = TimeSlot::new(gate_id, starts_at, ends_at, 4);
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
            Arc::clone(&bookings) as Arc<dyn BookingStore>,
            CapacityLedger::new(Arc::clone(&slots) as Arc<dyn SlotStore>),
            audit.clone(),
            Notifier::new(Arc::new(NullNotifier)),
            notary.clone(),
            Arc::clone(&clock),
        );
        let validator = GateAdmissionValidator::new(
            Arc::clone(&bookings) as Arc<dyn BookingStore>,
            Arc::clone(&slots) as Arc<dyn SlotStore>,
            audit.clone(),
            Notifier::new(Arc::new(NullNotifier)),
            notary,
            clock,
        );
        Fixture {
            validator,
            manager,
            slots,
            audit,
            gate_id,
            slot_id,
        }
    }

    async fn fixture_open_window() -> Fixture {
        let now = Utc::now();
        fixture_with_window(now - ChronoDuration::minutes(30), now + ChronoDuration::hours(1))
            .await
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

    fn scanner() -> ActorContext {
        ActorContext::new(ActorId::new(), Role::System)
    }

    async fn confirmed_booking(fx: &Fixture) -> Booking {
        let carrier = ActorContext::new(ActorId::new(), Role::Carrier);
        let operator = ActorContext::new(ActorId::new(), Role::Operator);
        let booking = fx.manager.create(request(fx.slot_id), &carrier).await.unwrap();
        fx.manager
            .change_status(booking.id, BookingStatus::Confirmed, &operator)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn confirmed_booking_in_window_is_granted_once() {
        let fx = fixture_open_window().await;
        let booking = confirmed_booking(&fx).await;

        let summary = fx
            .validator
            .validate_entry(fx.gate_id, booking.id, &scanner())
            .await
            .unwrap();
        assert_eq!(summary.status, BookingStatus::Consumed);
        assert_eq!(summary.truck_plate, "HH-PG 714");

        // The replay deterministically reports the pass as used.
        let err = fx
            .validator
            .validate_entry(fx.gate_id, booking.id, &scanner())
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::Denied(DeniedReason::AlreadyUsed));
    }

    #[tokio::test]
    async fn admission_does_not_touch_capacity() {
        let fx = fixture_open_window().await;
        let booking = confirmed_booking(&fx).await;
        let before = fx.slots.get(fx.slot_id).await.unwrap().current_bookings;

        fx.validator
            .validate_entry(fx.gate_id, booking.id, &scanner())
            .await
            .unwrap();

        let after = fx.slots.get(fx.slot_id).await.unwrap().current_bookings;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn unknown_reference_is_not_found() {
        let fx = fixture_open_window().await;
        let err = fx
            .validator
            .validate_entry(fx.gate_id, BookingId::new(), &scanner())
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::Denied(DeniedReason::NotFound));
    }

    #[tokio::test]
    async fn pending_booking_is_wrong_state() {
        let fx = fixture_open_window().await;
        let carrier = ActorContext::new(ActorId::new(), Role::Carrier);
        let booking = fx.manager.create(request(fx.slot_id), &carrier).await.unwrap();

        let err = fx
            .validator
            .validate_entry(fx.gate_id, booking.id, &scanner())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AdmissionError::Denied(DeniedReason::WrongState(BookingStatus::Pending))
        );
    }

    #[tokio::test]
    async fn other_gate_is_wrong_gate() {
        let fx = fixture_open_window().await;
        let booking = confirmed_booking(&fx).await;

        let err = fx
            .validator
            .validate_entry(GateId::new(), booking.id, &scanner())
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::Denied(DeniedReason::WrongGate));
    }

    #[tokio::test]
    async fn arrival_before_window_is_denied() {
        let now = Utc::now();
        let fx = fixture_with_window(
            now + ChronoDuration::hours(1),
            now + ChronoDuration::hours(2),
        )
        .await;
        let booking = confirmed_booking(&fx).await;

        let err = fx
            .validator
            .validate_entry(fx.gate_id, booking.id, &scanner())
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::Denied(DeniedReason::OutsideWindow));
    }

    #[tokio::test]
    async fn arrival_after_window_is_denied() {
        let now = Utc::now();
        let fx = fixture_with_window(
            now - ChronoDuration::hours(2),
            now - ChronoDuration::minutes(1),
        )
        .await;

        // The window is already over, so create() would refuse; seed the
        // confirmed booking directly through the store.
        let mut booking = Booking::new(request(fx.slot_id), ActorId::new(), now);
        booking.status = BookingStatus::Confirmed;
        let booking_id = booking.id;
        fx.validator.bookings.insert(booking).await.unwrap();

        let err = fx
            .validator
            .validate_entry(fx.gate_id, booking_id, &scanner())
            .await
            .unwrap_err();
        assert_eq!(err, AdmissionError::Denied(DeniedReason::OutsideWindow));
    }

    #[tokio::test]
    async fn denied_attempts_are_audited() {
        let fx = fixture_open_window().await;
        let missing = BookingId::new();

        let _ = fx
            .validator
            .validate_entry(fx.gate_id, missing, &scanner())
            .await;

        let entries = fx
            .audit
            .query(&AuditQuery::for_subject(*missing.as_uuid()))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::AdmissionDenied);
        assert_eq!(entries[0].details["reason"], "not-found");
    }
}

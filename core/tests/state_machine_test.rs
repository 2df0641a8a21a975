//! Property tests for the booking state machine.
//!
//! For any sequence of requested status changes, the stored status only
//! ever moves along the allowed state graph, every illegal request
//! returns a typed error and leaves the booking unchanged, and the slot
//! occupancy counter tracks exactly the non-terminal bookings.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Test code can use unwrap/expect

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use portgate_core::environment::SystemClock;
use portgate_core::{
    ActorContext, ActorId, BookingStatus, CarrierId, CreateBookingRequest, DriverInfo, Engine,
    EngineError, EngineStores, GateId, LedgerClient, LedgerError, LedgerReceipt, NullNotifier,
    Role, SlotId, TruckId,
};
use proptest::prelude::*;
use std::sync::Arc;
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

fn engine() -> Engine {
    Engine::new(
        EngineStores::in_memory(),
        Arc::new(SystemClock),
        Arc::new(NullNotifier),
        Arc::new(OkLedger),
        Duration::from_millis(100),
    )
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

fn requested_status() -> impl Strategy<Value = BookingStatus> {
    prop_oneof![
        Just(BookingStatus::Confirmed),
        Just(BookingStatus::Rejected),
        Just(BookingStatus::Cancelled),
        Just(BookingStatus::Consumed),
        Just(BookingStatus::Pending),
    ]
}

/// Whether a booking in `status` holds a unit of slot capacity.
const fn holds_capacity(status: BookingStatus) -> bool {
    matches!(
        status,
        BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Consumed
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn status_only_moves_along_the_state_graph(targets in prop::collection::vec(requested_status(), 1..12)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        rt.block_on(async move {
            let engine = engine();
            let operator = ActorContext::new(ActorId::new(), Role::Operator);
            let now = Utc::now();
            let slot = engine
                .create_slot(GateId::new(), now, now + ChronoDuration::hours(1), 1, &operator)
                .await
                .unwrap();
            let booking = engine
                .create_booking(request(slot.id), &ActorContext::new(ActorId::new(), Role::Carrier))
                .await
                .unwrap();

            let mut model = BookingStatus::Pending;
            for target in targets {
                let requestable = matches!(
                    target,
                    BookingStatus::Confirmed | BookingStatus::Rejected | BookingStatus::Cancelled
                );
                let outcome = engine
                    .change_booking_status(booking.id, target, &operator)
                    .await;

                if requestable && model.can_transition_to(target) {
                    let updated = outcome.expect("legal transition must succeed");
                    prop_assert_eq!(updated.status, target);
                    if target == BookingStatus::Confirmed {
                        prop_assert!(updated.proof_token.is_some());
                    }
                    model = target;
                } else {
                    let err = outcome.expect_err("illegal transition must fail");
                    if requestable {
                        prop_assert_eq!(
                            err,
                            EngineError::InvalidTransition { from: model, to: target }
                        );
                    } else {
                        prop_assert!(matches!(err, EngineError::Validation(_)));
                    }
                }

                // The stored booking always matches the model...
                let stored = engine.get_booking(booking.id).await.unwrap();
                prop_assert_eq!(stored.status, model);

                // ...and the occupancy counter tracks it exactly.
                let occupancy = engine.get_slot(slot.id).await.unwrap().current_bookings;
                prop_assert_eq!(occupancy, u32::from(holds_capacity(model)));
            }
            Ok(())
        })?;
    }
}

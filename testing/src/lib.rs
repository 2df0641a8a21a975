//! # PortGate Testing
//!
//! Test doubles for the engine's collaborator traits: a controllable
//! clock, a recording notification sink, and a scriptable external
//! ledger. Production code never depends on this crate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portgate_core::environment::Clock;
use portgate_core::{
    EngineEvent, LedgerClient, LedgerError, LedgerReceipt, NotificationSink, NotifyError,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock implementations for testing.
pub mod mocks {
    use super::{
        Arc, Clock, DateTime, Duration, EngineEvent, LedgerClient, LedgerError, LedgerReceipt,
        Mutex, NotificationSink, NotifyError, Utc, async_trait, locked,
    };

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time until the test advances it.
    #[derive(Debug, Default)]
    pub struct FixedClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock to `time`
        pub fn set(&self, time: DateTime<Utc>) {
            *locked(&self.time) = time;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *locked(&self.time)
        }
    }

    /// Create a default fixed clock for tests (2026-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        ))
    }

    /// Notification sink that records every published event
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        events: Mutex<Vec<EngineEvent>>,
    }

    impl RecordingNotifier {
        /// Creates an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Everything published so far, in delivery order
        #[must_use]
        pub fn events(&self) -> Vec<EngineEvent> {
            locked(&self.events).clone()
        }

        /// Wait (bounded) until at least `count` events have arrived.
        /// Published events are dispatched off the caller's critical path,
        /// so tests must rendezvous rather than assert immediately.
        pub async fn wait_for(&self, count: usize) -> Vec<EngineEvent> {
            for _ in 0..200 {
                let events = self.events();
                if events.len() >= count {
                    return events;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            self.events()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingNotifier {
        async fn publish(&self, event: EngineEvent) -> Result<(), NotifyError> {
            locked(&self.events).push(event);
            Ok(())
        }
    }

    /// How the scripted ledger answers the next submission
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LedgerMode {
        /// Return a receipt
        Healthy,
        /// Fail as unreachable
        Unreachable,
        /// Hang past any reasonable timeout
        Hanging,
    }

    /// Scriptable external ledger double
    pub struct ScriptedLedger {
        mode: Mutex<LedgerMode>,
        submissions: Mutex<Vec<String>>,
    }

    impl ScriptedLedger {
        /// Creates a ledger in the given starting mode
        #[must_use]
        pub fn new(mode: LedgerMode) -> Self {
            Self {
                mode: Mutex::new(mode),
                submissions: Mutex::new(Vec::new()),
            }
        }

        /// Change the answer for subsequent submissions
        pub fn set_mode(&self, mode: LedgerMode) {
            *locked(&self.mode) = mode;
        }

        /// Every hash submitted so far, in order
        #[must_use]
        pub fn submissions(&self) -> Vec<String> {
            locked(&self.submissions).clone()
        }
    }

    #[async_trait]
    impl LedgerClient for ScriptedLedger {
        async fn submit(&self, content_hash: &str) -> Result<LedgerReceipt, LedgerError> {
            locked(&self.submissions).push(content_hash.to_string());
            let mode = *locked(&self.mode);
            match mode {
                LedgerMode::Healthy => Ok(LedgerReceipt {
                    reference: format!("anchor:{content_hash}"),
                    recorded_at: Utc::now(),
                }),
                LedgerMode::Unreachable => {
                    Err(LedgerError::Unavailable("connection refused".to_string()))
                }
                LedgerMode::Hanging => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(LedgerError::Timeout)
                }
            }
        }
    }
}

//! Fire-and-forget notification fan-out.
//!
//! The real-time dispatcher (websockets, push, whatever the terminal runs)
//! is an external collaborator behind [`NotificationSink`]. The engine
//! publishes off the critical path: a failed or slow sink never fails the
//! state transition that produced the event.

use crate::error::NotifyError;
use crate::types::EngineEvent;
use async_trait::async_trait;
use std::sync::Arc;

/// Collaborator that accepts engine events for real-time fan-out.
///
/// Delivery is at-most-once from the engine's point of view; the engine
/// does not retry.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Delivery`] when the sink cannot take the
    /// event. The engine logs and drops the error.
    async fn publish(&self, event: EngineEvent) -> Result<(), NotifyError>;
}

/// Sink that discards every event. Default for deployments without a
/// real-time channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl NotificationSink for NullNotifier {
    async fn publish(&self, _event: EngineEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Engine-side dispatcher wrapping the sink.
///
/// `dispatch` spawns the delivery so the calling operation returns without
/// awaiting the sink.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    /// Creates a dispatcher over `sink`
    #[must_use]
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Publish `event` without blocking the caller. Failures are logged at
    /// WARN and swallowed.
    pub fn dispatch(&self, event: EngineEvent) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            let kind = event.kind;
            if let Err(err) = sink.publish(event).await {
                tracing::warn!(%kind, error = %err, "notification delivery failed");
            }
        });
    }
}

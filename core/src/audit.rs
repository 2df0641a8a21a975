//! Append-only audit trail.
//!
//! Every state-changing operation in the engine records exactly one entry.
//! The trail is the durable source of truth when the external notarization
//! ledger is unreachable, so `record` must never fail the caller: storage
//! errors are logged and swallowed.

use crate::environment::Clock;
use crate::error::EngineError;
use crate::store::AuditStore;
use crate::types::{
    ActorContext, AuditAction, AuditEntry, AuditEntryId, AuditQuery, SubjectType,
};
use std::sync::Arc;
use uuid::Uuid;

/// Engine-side handle to the audit store
#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn AuditStore>,
    clock: Arc<dyn Clock>,
}

impl AuditTrail {
    /// Creates a trail over `store`
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append one entry for a state-changing action.
    ///
    /// Best-effort: if the underlying store is unavailable the failure is
    /// logged and the caller's primary operation proceeds untouched.
    pub async fn record(
        &self,
        actor: &ActorContext,
        action: AuditAction,
        subject_type: SubjectType,
        subject_id: Uuid,
        details: serde_json::Value,
    ) {
        let entry = AuditEntry {
            id: AuditEntryId::new(),
            actor_id: actor.actor_id,
            action,
            subject_type,
            subject_id,
            details,
            recorded_at: self.clock.now(),
        };
        if let Err(err) = self.store.append(entry).await {
            tracing::error!(%action, %subject_id, error = %err, "audit append failed");
        }
    }

    /// Entries matching `query`, ordered by timestamp ascending.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the read fails.
    pub async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, EngineError> {
        Ok(self.store.query(query).await?)
    }
}

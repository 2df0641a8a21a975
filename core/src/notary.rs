//! Notarization pipeline: best-effort external anchoring of confirmed
//! events.
//!
//! The pipeline derives a deterministic SHA-256 hash over the essential
//! fields of a confirmed event and submits it to an external immutable
//! ledger with a bounded timeout, off the caller's critical path. When the
//! ledger is unreachable the attempt is still recorded (`succeeded =
//! false`) and the audit trail written by the caller remains the system of
//! record; the triggering operation is never blocked, failed, or rolled
//! back.

use crate::audit::AuditTrail;
use crate::environment::Clock;
use crate::error::LedgerError;
use crate::store::NotarizationStore;
use crate::types::{
    ActorContext, ActorId, AuditAction, GateId, LedgerReceipt, NotarizationRecord, ProofToken,
    Role, SubjectType,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// External immutable ledger accepting content hashes
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submit a hex-encoded content hash; the call must be bounded.
    ///
    /// # Errors
    ///
    /// Returns a [`LedgerError`] when the ledger cannot record the hash.
    async fn submit(&self, content_hash: &str) -> Result<LedgerReceipt, LedgerError>;
}

/// What kind of event a notarized payload describes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassageKind {
    /// Operator confirmed the booking
    Confirmation,
    /// The truck was admitted through the gate
    GateAdmission,
}

/// Essential fields of a confirmed event, canonicalized before hashing.
///
/// Field order is fixed by the struct definition, so serialization (and
/// therefore the hash) is deterministic for identical content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryPayload {
    /// Booking the event belongs to
    pub subject_id: Uuid,
    /// Event kind
    pub kind: PassageKind,
    /// Truck registration plate
    pub truck_plate: String,
    /// Gate involved
    pub gate_id: GateId,
    /// One-time admission proof token, when assigned
    pub proof_token: Option<ProofToken>,
    /// When the event happened
    pub occurred_at: DateTime<Utc>,
}

/// Hex-encoded SHA-256 over the canonical JSON encoding of `payload`.
#[must_use]
pub fn content_hash(payload: &NotaryPayload) -> String {
    // serde_json writes struct fields in declaration order; the encoding
    // is canonical as long as the payload shape is.
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    digest.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Asynchronous, never-blocking notarization of confirmed events
#[derive(Clone)]
pub struct NotarizationPipeline {
    store: Arc<dyn NotarizationStore>,
    ledger: Arc<dyn LedgerClient>,
    audit: AuditTrail,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    pipeline_actor: ActorContext,
}

impl NotarizationPipeline {
    /// Creates a pipeline submitting to `ledger` with the given bound on
    /// each external write.
    #[must_use]
    pub fn new(
        store: Arc<dyn NotarizationStore>,
        ledger: Arc<dyn LedgerClient>,
        audit: AuditTrail,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            ledger,
            audit,
            clock,
            timeout,
            pipeline_actor: ActorContext::new(ActorId::new(), Role::System),
        }
    }

    /// Fire-and-forget notarization. Computes the content hash, returns it
    /// immediately, and performs the bounded ledger write on a background
    /// task.
    pub fn notarize(&self, payload: NotaryPayload) -> String {
        let hash = content_hash(&payload);
        let this = self.clone();
        let task_hash = hash.clone();
        tokio::spawn(async move {
            this.run_attempt(payload, task_hash).await;
        });
        hash
    }

    /// One complete notarization attempt: bounded ledger write, record of
    /// the outcome, and a degraded-path audit entry on failure.
    ///
    /// `notarize` runs this on a background task; tests call it directly
    /// for a deterministic result.
    pub async fn run_attempt(&self, payload: NotaryPayload, hash: String) -> NotarizationRecord {
        let attempted_at = self.clock.now();
        let outcome = match tokio::time::timeout(self.timeout, self.ledger.submit(&hash)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(LedgerError::Timeout),
        };

        let record = match outcome {
            Ok(receipt) => {
                tracing::debug!(subject_id = %payload.subject_id, reference = %receipt.reference,
                    "event notarized");
                NotarizationRecord {
                    subject_id: payload.subject_id,
                    content_hash: hash,
                    receipt: Some(receipt),
                    succeeded: true,
                    attempted_at,
                }
            }
            Err(err) => {
                tracing::warn!(subject_id = %payload.subject_id, error = %err,
                    "ledger write failed; audit trail remains the system of record");
                self.audit
                    .record(
                        &self.pipeline_actor,
                        AuditAction::NotarizationFailed,
                        SubjectType::Booking,
                        payload.subject_id,
                        serde_json::json!({
                            "kind": payload.kind,
                            "content_hash": hash,
                            "error": err.to_string(),
                        }),
                    )
                    .await;
                NotarizationRecord {
                    subject_id: payload.subject_id,
                    content_hash: hash,
                    receipt: None,
                    succeeded: false,
                    attempted_at,
                }
            }
        };

        if let Err(err) = self.store.record(record.clone()).await {
            tracing::error!(subject_id = %payload.subject_id, error = %err,
                "failed to persist notarization record");
        }
        record
    }

    /// Every attempt recorded for a subject, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::Storage`] if the read fails.
    pub async fn attempts(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<NotarizationRecord>, crate::error::EngineError> {
        Ok(self.store.list_for_subject(subject_id).await?)
    }
}

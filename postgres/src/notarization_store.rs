//! `PostgreSQL` notarization record store.

use crate::backend_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portgate_core::store::NotarizationStore;
use portgate_core::{LedgerReceipt, NotarizationRecord, StoreError};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct NotarizationRow {
    subject_id: Uuid,
    content_hash: String,
    receipt: Option<serde_json::Value>,
    succeeded: bool,
    attempted_at: DateTime<Utc>,
}

impl NotarizationRow {
    fn into_record(self) -> Result<NotarizationRecord, StoreError> {
        let receipt = self
            .receipt
            .map(serde_json::from_value::<LedgerReceipt>)
            .transpose()
            .map_err(|e| StoreError::Backend(format!("malformed receipt: {e}")))?;
        Ok(NotarizationRecord {
            subject_id: self.subject_id,
            content_hash: self.content_hash,
            receipt,
            succeeded: self.succeeded,
            attempted_at: self.attempted_at,
        })
    }
}

/// Notarization repository backed by the `notarization_records` table
#[derive(Clone)]
pub struct PostgresNotarizationStore {
    pool: Arc<PgPool>,
}

impl PostgresNotarizationStore {
    /// Creates a store over `pool`
    #[must_use]
    pub const fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotarizationStore for PostgresNotarizationStore {
    async fn record(&self, record: NotarizationRecord) -> Result<(), StoreError> {
        let receipt = record
            .receipt
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Backend(format!("unserializable receipt: {e}")))?;
        sqlx::query(
            "INSERT INTO notarization_records (subject_id, content_hash, receipt, succeeded,
                 attempted_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT DO NOTHING",
        )
        .bind(record.subject_id)
        .bind(&record.content_hash)
        .bind(receipt)
        .bind(record.succeeded)
        .bind(record.attempted_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(backend_err)?;
        Ok(())
    }

    async fn list_for_subject(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<NotarizationRecord>, StoreError> {
        let rows: Vec<NotarizationRow> = sqlx::query_as(
            "SELECT subject_id, content_hash, receipt, succeeded, attempted_at
             FROM notarization_records WHERE subject_id = $1
             ORDER BY attempted_at",
        )
        .bind(subject_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(backend_err)?;
        rows.into_iter().map(NotarizationRow::into_record).collect()
    }
}

//! `PostgreSQL` audit store: plain inserts into an append-only table.

use crate::backend_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portgate_core::store::AuditStore;
use portgate_core::types::{AuditEntry, AuditEntryId, AuditQuery, SubjectType};
use portgate_core::{ActorId, AuditAction, StoreError};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    actor_id: Uuid,
    action: String,
    subject_type: String,
    subject_id: Uuid,
    details: serde_json::Value,
    recorded_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self) -> Result<AuditEntry, StoreError> {
        let action: AuditAction = self
            .action
            .parse()
            .map_err(|e: String| StoreError::Backend(e))?;
        let subject_type: SubjectType = self
            .subject_type
            .parse()
            .map_err(|e: String| StoreError::Backend(e))?;
        Ok(AuditEntry {
            id: AuditEntryId::from_uuid(self.id),
            actor_id: ActorId::from_uuid(self.actor_id),
            action,
            subject_type,
            subject_id: self.subject_id,
            details: self.details,
            recorded_at: self.recorded_at,
        })
    }
}

/// Audit repository backed by the `audit_entries` table
#[derive(Clone)]
pub struct PostgresAuditStore {
    pool: Arc<PgPool>,
}

impl PostgresAuditStore {
    /// Creates a store over `pool`
    #[must_use]
    pub const fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, entry: AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO audit_entries (id, actor_id, action, subject_type, subject_id,
                 details, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id.as_uuid())
        .bind(entry.actor_id.as_uuid())
        .bind(entry.action.as_str())
        .bind(entry.subject_type.as_str())
        .bind(entry.subject_id)
        .bind(&entry.details)
        .bind(entry.recorded_at)
        .execute(self.pool.as_ref())
        .await
        .map_err(backend_err)?;
        Ok(())
    }

    async fn query(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>, StoreError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, actor_id, action, subject_type, subject_id, details, recorded_at
             FROM audit_entries WHERE 1 = 1",
        );
        if let Some(subject_id) = query.subject_id {
            builder.push(" AND subject_id = ");
            builder.push_bind(subject_id);
        }
        if let Some(actor_id) = query.actor_id {
            builder.push(" AND actor_id = ");
            builder.push_bind(*actor_id.as_uuid());
        }
        if let Some(from) = query.from {
            builder.push(" AND recorded_at >= ");
            builder.push_bind(from);
        }
        if let Some(to) = query.to {
            builder.push(" AND recorded_at <= ");
            builder.push_bind(to);
        }
        builder.push(" ORDER BY recorded_at");

        let rows: Vec<AuditRow> = builder
            .build_query_as()
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(backend_err)?;
        rows.into_iter().map(AuditRow::into_entry).collect()
    }
}

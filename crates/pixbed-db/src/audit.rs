//! Append-only audit log
//!
//! Audit events are emitted fire-and-forget after an operation has decided
//! its outcome; a failing sink is logged by the caller and never affects the
//! request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use pixbed_core::AppError;

/// One append-only audit record.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: String,
    pub resource_id: String,
    pub actor_id: Uuid,
    pub detail: Option<JsonValue>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(action: impl Into<String>, resource_id: impl Into<String>, actor_id: Uuid) -> Self {
        AuditEvent {
            action: action.into(),
            resource_id: resource_id.into(),
            actor_id,
            detail: None,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_detail(mut self, detail: JsonValue) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Sink for append-only audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, event: AuditEvent) -> Result<(), AppError>;
}

/// PostgreSQL-backed audit sink.
#[derive(Clone)]
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    #[tracing::instrument(skip(self, event), fields(db.table = "audit_events", db.operation = "insert", action = %event.action))]
    async fn append(&self, event: AuditEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (action, resource_id, actor_id, detail, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&event.action)
        .bind(&event.resource_id)
        .bind(event.actor_id)
        .bind(&event.detail)
        .bind(event.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_entity::audit::{AuditLogEntry, CreateAuditLogEntry};

use super::db_error;
use crate::store::AuditStore;

/// Repository for the append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn append(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_logs (actor_id, actor_name, action, entity_type, entity_id, \
             entity_name, details, ip_address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.actor_id)
        .bind(&data.actor_name)
        .bind(data.action)
        .bind(data.entity_type)
        .bind(data.entity_id)
        .bind(&data.entity_name)
        .bind(&data.details)
        .bind(&data.ip_address)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to append audit entry"))
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count audit entries"))?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_logs ORDER BY seq DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list audit entries"))?;

        Ok(PageResponse::new(entries, page.page, page.page_size, total as u64))
    }

    async fn list_by_actor(
        &self,
        actor_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs WHERE actor_id = $1")
            .bind(actor_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count audit entries"))?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_logs WHERE actor_id = $1 ORDER BY seq DESC LIMIT $2 OFFSET $3",
        )
        .bind(actor_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list audit entries"))?;

        Ok(PageResponse::new(entries, page.page, page.page_size, total as u64))
    }
}

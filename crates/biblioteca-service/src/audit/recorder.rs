//! Append-only audit recorder.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use biblioteca_auth::predicates::can_view_audit_log;
use biblioteca_core::error::AppError;
use biblioteca_core::events::{EventBus, EventPayload};
use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_database::store::AuditStore;
use biblioteca_entity::audit::{AuditAction, AuditEntityType, AuditLogEntry, CreateAuditLogEntry};

use crate::context::SessionContext;

/// Records one entry per mutation in the single audit log and serves
/// the global and per-actor views of it.
#[derive(Debug, Clone)]
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
    events: EventBus,
}

impl AuditRecorder {
    /// Creates a new audit recorder.
    pub fn new(store: Arc<dyn AuditStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Append an entry for an action `ctx` just completed.
    ///
    /// The mutation has already committed, so a failed append is logged
    /// and swallowed rather than reported to the caller.
    pub async fn record(
        &self,
        ctx: &SessionContext,
        action: AuditAction,
        entity_type: AuditEntityType,
        entity_id: Uuid,
        entity_name: &str,
        details: impl Into<String>,
    ) -> Option<AuditLogEntry> {
        let details: String = details.into();
        let entry = CreateAuditLogEntry {
            actor_id: ctx.user_id,
            actor_name: ctx.actor_label(),
            action,
            entity_type,
            entity_id,
            entity_name: entity_name.to_string(),
            details: (!details.is_empty()).then_some(details),
            ip_address: ctx.ip_address.clone(),
        };

        match self.store.append(&entry).await {
            Ok(stored) => {
                debug!(
                    seq = stored.seq,
                    actor_id = %stored.actor_id,
                    action = %stored.action,
                    entity_type = %stored.entity_type,
                    entity_id = %stored.entity_id,
                    "Audit entry recorded"
                );
                self.events.publish(
                    Some(ctx.user_id),
                    EventPayload::AuditRecorded {
                        seq: stored.seq,
                        actor_id: stored.actor_id,
                    },
                );
                Some(stored)
            }
            Err(e) => {
                warn!(
                    actor_id = %ctx.user_id,
                    action = %action,
                    entity_type = %entity_type,
                    entity_id = %entity_id,
                    error = %e,
                    "Failed to record audit entry"
                );
                None
            }
        }
    }

    /// The global log, newest first. Admin only.
    pub async fn list_all(
        &self,
        ctx: &SessionContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        if !can_view_audit_log(ctx.role, false) {
            return Err(AppError::authorization(
                "Only administrators can view the audit log",
            ));
        }
        self.store.list(page).await
    }

    /// Entries of one actor, newest first. The actor or an admin only.
    pub async fn list_for_actor(
        &self,
        ctx: &SessionContext,
        actor_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        if !can_view_audit_log(ctx.role, ctx.user_id == actor_id) {
            return Err(AppError::authorization(
                "You can only view your own activity",
            ));
        }
        self.store.list_by_actor(actor_id, page).await
    }

    /// The caller's own entries, newest first.
    pub async fn list_mine(
        &self,
        ctx: &SessionContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        self.list_for_actor(ctx, ctx.user_id, page).await
    }
}

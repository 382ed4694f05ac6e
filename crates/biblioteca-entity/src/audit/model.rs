//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::{AuditAction, AuditEntityType};

/// An immutable audit log entry.
///
/// Entries are ordered by `seq`, which the store assigns monotonically;
/// `created_at` is the store's clock, never the caller's.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Store-assigned sequence number.
    pub seq: i64,
    /// The user who performed the action.
    pub actor_id: Uuid,
    /// Display label of the actor at the time of the action.
    pub actor_name: String,
    /// The action performed.
    pub action: AuditAction,
    /// Kind of entity acted upon.
    pub entity_type: AuditEntityType,
    /// Entity identifier.
    pub entity_id: Uuid,
    /// Entity name or title at the time of the action.
    pub entity_name: String,
    /// Free-text details.
    pub details: Option<String>,
    /// IP address of the actor.
    pub ip_address: Option<String>,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

/// Data required to append an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    /// Acting user.
    pub actor_id: Uuid,
    /// Acting user's label.
    pub actor_name: String,
    /// Action performed.
    pub action: AuditAction,
    /// Entity kind.
    pub entity_type: AuditEntityType,
    /// Entity identifier.
    pub entity_id: Uuid,
    /// Entity name.
    pub entity_name: String,
    /// Free-text details.
    pub details: Option<String>,
    /// Actor's IP address.
    pub ip_address: Option<String>,
}

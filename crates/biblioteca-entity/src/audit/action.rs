//! Audit action and entity-type enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to the audited entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Entity created.
    Create,
    /// Entity updated or moved.
    Update,
    /// Entity deleted.
    Delete,
    /// A user's role changed.
    RoleChange,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::RoleChange => "role_change",
        };
        write!(f, "{s}")
    }
}

/// Kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_entity_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AuditEntityType {
    /// A document.
    Document,
    /// A folder.
    Folder,
    /// A category.
    Category,
    /// A tag.
    Tag,
    /// A user profile.
    User,
}

impl fmt::Display for AuditEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Document => "document",
            Self::Folder => "folder",
            Self::Category => "category",
            Self::Tag => "tag",
            Self::User => "user",
        };
        write!(f, "{s}")
    }
}

//! Live query names and parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use biblioteca_auth::predicates::{can_list_all_users, can_view_audit_log};
use biblioteca_core::error::AppError;
use biblioteca_entity::user::UserRole;

/// A named query a client can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "query", content = "id", rename_all = "snake_case")]
pub enum LiveQuery {
    /// Every category.
    Categories,
    /// Every tag.
    Tags,
    /// Root folders of a category.
    CategoryFolders(Uuid),
    /// Root documents of a category.
    CategoryDocuments(Uuid),
    /// Direct sub-folders of a folder.
    FolderChildren(Uuid),
    /// Documents directly inside a folder.
    FolderDocuments(Uuid),
    /// A single document.
    Document(Uuid),
    /// Every user profile. Admin only.
    Users,
    /// The global audit log. Admin only.
    Audit,
    /// The subscriber's own audit trail.
    AuditMine,
    /// Progress of one upload. Frames go to the uploader only.
    Upload(Uuid),
}

impl LiveQuery {
    /// Parses a query name such as `folder:{id}:documents`.
    pub fn parse(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.trim().split(':').collect();
        match parts.as_slice() {
            ["categories"] => Some(Self::Categories),
            ["tags"] => Some(Self::Tags),
            ["users"] => Some(Self::Users),
            ["audit"] => Some(Self::Audit),
            ["audit", "me"] => Some(Self::AuditMine),
            ["category", id, "folders"] => parse_id(id).map(Self::CategoryFolders),
            ["category", id, "documents"] => parse_id(id).map(Self::CategoryDocuments),
            ["folder", id, "children"] => parse_id(id).map(Self::FolderChildren),
            ["folder", id, "documents"] => parse_id(id).map(Self::FolderDocuments),
            ["document", id] => parse_id(id).map(Self::Document),
            ["upload", id] => parse_id(id).map(Self::Upload),
            _ => None,
        }
    }

    /// Converts back to the query name clients use.
    pub fn to_channel_string(&self) -> String {
        match self {
            Self::Categories => "categories".to_string(),
            Self::Tags => "tags".to_string(),
            Self::Users => "users".to_string(),
            Self::Audit => "audit".to_string(),
            Self::AuditMine => "audit:me".to_string(),
            Self::CategoryFolders(id) => format!("category:{id}:folders"),
            Self::CategoryDocuments(id) => format!("category:{id}:documents"),
            Self::FolderChildren(id) => format!("folder:{id}:children"),
            Self::FolderDocuments(id) => format!("folder:{id}:documents"),
            Self::Document(id) => format!("document:{id}"),
            Self::Upload(id) => format!("upload:{id}"),
        }
    }

    /// Whether the query carries a snapshot. Upload queries only stream
    /// progress frames.
    pub fn has_snapshot(&self) -> bool {
        !matches!(self, Self::Upload(_))
    }

    /// Role gate applied before the subscription is registered.
    pub fn authorize(&self, role: UserRole) -> Result<(), AppError> {
        match self {
            Self::Users if !can_list_all_users(role) => Err(AppError::authorization(
                "Only administrators can watch the user list",
            )),
            Self::Audit if !can_view_audit_log(role, false) => Err(AppError::authorization(
                "Only administrators can watch the audit log",
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for LiveQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_channel_string())
    }
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

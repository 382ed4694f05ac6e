//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder inside a category. Folders nest to arbitrary depth through
/// `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Category the folder belongs to.
    pub category_id: Uuid,
    /// Parent folder ID (null for category root folders).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// The user who created the folder.
    pub created_by: Uuid,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a category root folder.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Owning category.
    pub category_id: Uuid,
    /// Parent folder (None for category root).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Creating user.
    pub created_by: Uuid,
}

/// Breadcrumb from the category root down to a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderPath {
    /// Category of the folder.
    pub category_id: Uuid,
    /// Ancestors first, the folder itself last.
    pub segments: Vec<Folder>,
    /// Set when an ancestor was deleted and the chain stops early.
    pub truncated: bool,
}

//! Category entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Top-level grouping of folders and documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    /// Unique category identifier.
    pub id: Uuid,
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// The user who created the category.
    pub created_by: Uuid,
    /// When the category was created.
    pub created_at: DateTime<Utc>,
    /// When the category was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategory {
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creating user.
    pub created_by: Uuid,
}

/// Partial category update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCategory {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

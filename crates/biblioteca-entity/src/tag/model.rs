//! Tag entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A label attachable to many documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: Uuid,
    /// Tag name, unique case-insensitively.
    pub name: String,
    /// The user who created the tag.
    pub created_by: Uuid,
    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A cataloged academic document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// Category the document belongs to.
    pub category_id: Uuid,
    /// Folder the document lives in (null at category root).
    pub folder_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Author(s).
    pub author: String,
    /// Publication year.
    pub year: Option<i32>,
    /// Abstract or summary.
    pub description: Option<String>,
    /// Subject area.
    pub subject: Option<String>,
    /// Edition or revision label.
    pub version: Option<String>,
    /// URL of the stored file.
    pub file_url: String,
    /// URL of a preview image.
    pub thumbnail_url: Option<String>,
    /// Attached tags.
    pub tag_ids: Vec<Uuid>,
    /// The user who created the document.
    pub created_by: Uuid,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// Strictly increases on every update or move.
    pub last_updated: DateTime<Utc>,
}

impl Document {
    /// Whether `user_id` created this document.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.created_by == user_id
    }
}

/// Data required to create a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Owning category.
    pub category_id: Uuid,
    /// Owning folder.
    pub folder_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Author(s).
    pub author: String,
    /// Publication year.
    pub year: Option<i32>,
    /// Abstract.
    pub description: Option<String>,
    /// Subject area.
    pub subject: Option<String>,
    /// Edition label.
    pub version: Option<String>,
    /// Stored file URL.
    pub file_url: String,
    /// Preview image URL.
    pub thumbnail_url: Option<String>,
    /// Attached tags.
    pub tag_ids: Vec<Uuid>,
    /// Creating user.
    pub created_by: Uuid,
}

/// Partial metadata update. Location changes go through a move instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocument {
    /// New title.
    pub title: Option<String>,
    /// New author.
    pub author: Option<String>,
    /// New year.
    pub year: Option<i32>,
    /// New description.
    pub description: Option<String>,
    /// New subject.
    pub subject: Option<String>,
    /// New version label.
    pub version: Option<String>,
    /// Replacement file URL.
    pub file_url: Option<String>,
    /// Replacement thumbnail URL.
    pub thumbnail_url: Option<String>,
    /// Replacement tag list.
    pub tag_ids: Option<Vec<Uuid>>,
}

/// Search filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentSearch {
    /// Case-insensitive substring matched against title, author, subject,
    /// and description.
    pub query: String,
    /// Restrict to a category.
    pub category_id: Option<Uuid>,
    /// Restrict to documents carrying this tag.
    pub tag_id: Option<Uuid>,
    /// Maximum number of results.
    pub limit: u64,
}

impl DocumentSearch {
    /// Whether `doc` satisfies the filters. Used by the in-memory store; the
    /// Postgres store expresses the same predicate in SQL.
    pub fn matches(&self, doc: &Document) -> bool {
        if self.category_id.is_some_and(|c| c != doc.category_id) {
            return false;
        }
        if self.tag_id.is_some_and(|t| !doc.tag_ids.contains(&t)) {
            return false;
        }
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(doc.title.as_str()),
            Some(doc.author.as_str()),
            doc.subject.as_deref(),
            doc.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document {
            id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            folder_id: None,
            title: "Teoría de Grafos".into(),
            author: "Diestel".into(),
            year: Some(2017),
            description: Some("Graduate text".into()),
            subject: Some("Mathematics".into()),
            version: None,
            file_url: "http://x/files/a.pdf".into(),
            thumbnail_url: None,
            tag_ids: vec![],
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_search_matches_any_text_field() {
        let d = doc();
        let mut s = DocumentSearch {
            query: "grafos".into(),
            ..Default::default()
        };
        assert!(s.matches(&d));
        s.query = "DIESTEL".into();
        assert!(s.matches(&d));
        s.query = "mathem".into();
        assert!(s.matches(&d));
        s.query = "chemistry".into();
        assert!(!s.matches(&d));
    }

    #[test]
    fn test_search_filters() {
        let d = doc();
        let s = DocumentSearch {
            query: String::new(),
            category_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!s.matches(&d));
        let s = DocumentSearch {
            query: String::new(),
            tag_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!s.matches(&d));
    }
}

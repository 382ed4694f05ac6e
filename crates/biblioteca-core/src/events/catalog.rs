//! Category, folder, document, and tag events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events emitted when the catalog hierarchy changes.
///
/// Each variant carries the parent coordinates live queries are keyed by,
/// so listeners never need to re-read the entity to route the change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// A category was created, renamed, or deleted.
    CategoryChanged {
        /// The category ID.
        category_id: Uuid,
    },
    /// A folder was created, renamed, or deleted.
    FolderChanged {
        /// The folder ID.
        folder_id: Uuid,
        /// Category the folder belongs to.
        category_id: Uuid,
        /// Parent folder (`None` for a category root folder).
        parent_id: Option<Uuid>,
    },
    /// A document was created, updated, or deleted.
    DocumentChanged {
        /// The document ID.
        document_id: Uuid,
        /// Category the document belongs to.
        category_id: Uuid,
        /// Folder the document belongs to (`None` at category root).
        folder_id: Option<Uuid>,
    },
    /// A document was relocated.
    DocumentMoved {
        /// The document ID.
        document_id: Uuid,
        /// Previous category.
        from_category_id: Uuid,
        /// Previous folder.
        from_folder_id: Option<Uuid>,
        /// New category.
        to_category_id: Uuid,
        /// New folder.
        to_folder_id: Option<Uuid>,
    },
    /// A tag was created, renamed, or deleted.
    TagsChanged,
    /// A tag was deleted and stripped from these documents.
    TagRemovedFromDocuments {
        /// Documents whose tag list changed.
        document_ids: Vec<Uuid>,
    },
}

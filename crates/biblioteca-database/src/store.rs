//! Store traits implemented by each persistence backend.
//!
//! Entity-specific queries live here rather than on a generic CRUD trait
//! because the hierarchy rules need conditional deletes that a plain
//! `delete(id)` cannot express atomically.

use async_trait::async_trait;
use uuid::Uuid;

use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use biblioteca_entity::category::{Category, CreateCategory, UpdateCategory};
use biblioteca_entity::document::{CreateDocument, Document, DocumentSearch, UpdateDocument};
use biblioteca_entity::folder::{CreateFolder, Folder};
use biblioteca_entity::identity::{CreateIdentity, Identity};
use biblioteca_entity::tag::Tag;
use biblioteca_entity::user::{CreateProfile, UpdateProfile, User, UserRole};

/// Outcome of a conditional folder delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderDeletion {
    /// The folder was removed.
    Deleted,
    /// No folder with that ID exists.
    NotFound,
    /// Documents still reference the folder; nothing was removed.
    HasDocuments(u64),
}

/// Outcome of a conditional category delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryDeletion {
    /// The category was removed.
    Deleted,
    /// No category with that ID exists.
    NotFound,
    /// Folders or documents still reference the category.
    InUse {
        /// Folders in the category.
        folders: u64,
        /// Documents in the category.
        documents: u64,
    },
}

/// Why a folder or document cannot be placed at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// The target category does not exist.
    CategoryNotFound,
    /// The target folder does not exist.
    FolderNotFound,
    /// The target folder belongs to another category.
    FolderOutsideCategory,
}

/// Outcome of a write that places a row in the hierarchy. The location is
/// checked and the row written as one step, so a concurrent delete of the
/// target category or folder cannot slip in between.
#[derive(Debug, Clone)]
pub enum Placement<T> {
    /// The row was written.
    Placed(T),
    /// The row being moved does not exist.
    Missing,
    /// The location is invalid; nothing was written.
    Rejected(LocationError),
}

impl<T> Placement<T> {
    /// The written row, if any.
    pub fn placed(self) -> Option<T> {
        match self {
            Self::Placed(row) => Some(row),
            _ => None,
        }
    }
}

/// Authentication principals and their role claims.
#[async_trait]
pub trait IdentityStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a principal by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>>;

    /// Find a principal by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>>;

    /// Register a principal. Duplicate emails yield a conflict error.
    ///
    /// The emptiness check behind `bootstrap_role` and the insert are one
    /// atomic step, so concurrent first registrations grant it once.
    async fn create(&self, data: &CreateIdentity) -> AppResult<Identity>;

    /// Replace the role claim and bump `claims_updated_at`.
    async fn set_claim_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<Identity>>;

    /// Page through principals in registration order.
    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<Identity>>;
}

/// User profile records.
#[async_trait]
pub trait ProfileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a profile by user ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Insert a profile unless one already exists. Returns the stored
    /// profile and whether it was created by this call.
    async fn insert_if_absent(&self, data: &CreateProfile) -> AppResult<(User, bool)>;

    /// Overwrite the stored role.
    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<User>>;

    /// Insert the profile, or overwrite the role of an existing one.
    async fn upsert_role(&self, data: &CreateProfile) -> AppResult<User>;

    /// Apply a self-service profile update.
    async fn update(&self, id: Uuid, data: &UpdateProfile) -> AppResult<Option<User>>;

    /// List profiles ordered by creation time.
    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>>;
}

/// Categories.
#[async_trait]
pub trait CategoryStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a category by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    /// All categories ordered by name.
    async fn list_all(&self) -> AppResult<Vec<Category>>;

    /// Create a category.
    async fn create(&self, data: &CreateCategory) -> AppResult<Category>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, data: &UpdateCategory) -> AppResult<Option<Category>>;

    /// Delete the category only when no folder or document references it.
    async fn delete_if_unused(&self, id: Uuid) -> AppResult<CategoryDeletion>;
}

/// Folders.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Folders of a category with no parent, ordered by name.
    async fn list_roots(&self, category_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Direct children of a folder, ordered by name.
    async fn list_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>>;

    /// Ancestor chain from the topmost reachable ancestor down to the
    /// folder itself.
    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>>;

    /// Create a folder. The category must exist and the parent, if any,
    /// must belong to it.
    async fn create(&self, data: &CreateFolder) -> AppResult<Placement<Folder>>;

    /// Rename a folder.
    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Folder>>;

    /// Delete the folder only when no document directly references it.
    /// Sub-folders are not considered.
    async fn delete_if_empty(&self, id: Uuid) -> AppResult<FolderDeletion>;
}

/// Documents.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a document by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>>;

    /// All documents, most recently updated first.
    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Document>>;

    /// Documents of a category with no folder, ordered by title.
    async fn list_root(&self, category_id: Uuid) -> AppResult<Vec<Document>>;

    /// Documents directly inside a folder, ordered by title.
    async fn list_in_folder(&self, folder_id: Uuid) -> AppResult<Vec<Document>>;

    /// Create a document. The category must exist and the folder, if any,
    /// must belong to it.
    async fn create(&self, data: &CreateDocument) -> AppResult<Placement<Document>>;

    /// Apply a metadata update; `last_updated` strictly increases.
    async fn update(&self, id: Uuid, data: &UpdateDocument) -> AppResult<Option<Document>>;

    /// Replace category and folder in a single write, under the same rules
    /// as [`create`](Self::create); `last_updated` strictly increases.
    async fn move_to(
        &self,
        id: Uuid,
        category_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Placement<Document>>;

    /// Delete a document, returning the removed row.
    async fn delete(&self, id: Uuid) -> AppResult<Option<Document>>;

    /// Case-insensitive text search with optional filters.
    async fn search(&self, search: &DocumentSearch) -> AppResult<Vec<Document>>;

    /// Strip a tag from every document carrying it. Returns the IDs of the
    /// documents that changed.
    async fn remove_tag(&self, tag_id: Uuid) -> AppResult<Vec<Uuid>>;
}

/// Tags.
#[async_trait]
pub trait TagStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a tag by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tag>>;

    /// All tags ordered by name.
    async fn list_all(&self) -> AppResult<Vec<Tag>>;

    /// How many of `ids` exist.
    async fn count_existing(&self, ids: &[Uuid]) -> AppResult<u64>;

    /// Create a tag. Duplicate names (ignoring case) yield a conflict.
    async fn create(&self, name: &str, created_by: Uuid) -> AppResult<Tag>;

    /// Rename a tag.
    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Tag>>;

    /// Delete a tag. Returns `true` if it existed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// The append-only audit log.
#[async_trait]
pub trait AuditStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append an entry; the store assigns `seq` and `created_at`.
    async fn append(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Global log, newest first.
    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<AuditLogEntry>>;

    /// Entries of one actor, newest first.
    async fn list_by_actor(
        &self,
        actor_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}

//! Category, folder, document, and tag services.
//!
//! Every mutation checks the authorization predicates, enforces the
//! hierarchy invariants, records an audit entry, and publishes a catalog
//! event for live queries.

pub mod category;
pub mod document;
pub mod folder;
pub mod tag;

pub use category::{CategoryService, CreateCategoryRequest};
pub use document::{CreateDocumentRequest, DocumentService, MoveDocumentRequest};
pub use folder::{CreateFolderRequest, FolderService};
pub use tag::TagService;

use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_database::store::{LocationError, Placement};

/// Trim a required name and check its length.
pub(crate) fn required_name(value: &str, field: &str, max_chars: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Unwrap a placement, mapping a rejected location to the caller-facing
/// error. `folder` names the folder role in messages ("Folder", "Parent folder").
pub(crate) fn placed<T>(placement: Placement<T>, folder: &str, missing: &str) -> AppResult<T> {
    match placement {
        Placement::Placed(row) => Ok(row),
        Placement::Missing => Err(AppError::not_found(missing)),
        Placement::Rejected(LocationError::CategoryNotFound) => {
            Err(AppError::not_found("Category not found"))
        }
        Placement::Rejected(LocationError::FolderNotFound) => {
            Err(AppError::not_found(format!("{folder} not found")))
        }
        Placement::Rejected(LocationError::FolderOutsideCategory) => Err(AppError::hierarchy(
            format!("{folder} belongs to a different category"),
        )),
    }
}

/// Trim an optional text field, mapping blank input to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use uuid::Uuid;

    use biblioteca_core::events::EventBus;
    use biblioteca_database::DataStore;
    use biblioteca_entity::user::UserRole;
    use biblioteca_storage::{LocalStorageProvider, ObjectStore};

    use crate::audit::AuditRecorder;
    use crate::context::SessionContext;

    use super::*;

    pub struct Catalog {
        pub store: DataStore,
        pub bus: EventBus,
        pub categories: CategoryService,
        pub folders: FolderService,
        pub documents: DocumentService,
        pub tags: TagService,
        pub objects: ObjectStore,
        _dir: tempfile::TempDir,
    }

    pub async fn catalog() -> Catalog {
        let store = DataStore::memory();
        let bus = EventBus::default();
        let audit = AuditRecorder::new(store.audit.clone(), bus.clone());
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        let objects = ObjectStore::new(Arc::new(provider), "http://lib.test", 1 << 20);

        Catalog {
            categories: CategoryService::new(store.categories.clone(), audit.clone(), bus.clone()),
            folders: FolderService::new(
                store.folders.clone(),
                store.categories.clone(),
                audit.clone(),
                bus.clone(),
            ),
            documents: DocumentService::new(
                store.documents.clone(),
                store.categories.clone(),
                store.folders.clone(),
                store.tags.clone(),
                objects.clone(),
                audit.clone(),
                bus.clone(),
            ),
            tags: TagService::new(store.tags.clone(), store.documents.clone(), audit, bus.clone()),
            objects,
            store,
            bus,
            _dir: dir,
        }
    }

    pub fn session(role: UserRole) -> SessionContext {
        SessionContext::new(Uuid::new_v4(), role, Some(role), Some(format!("{role} tester")), None)
    }
}

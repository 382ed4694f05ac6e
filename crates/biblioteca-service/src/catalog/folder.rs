//! Folder operations and the folder deletion invariant.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use biblioteca_auth::predicates::{can_delete_folder, can_manage_folder};
use biblioteca_core::error::AppError;
use biblioteca_core::events::{CatalogEvent, EventBus, EventPayload};
use biblioteca_core::result::AppResult;
use biblioteca_database::store::{CategoryStore, FolderDeletion, FolderStore};
use biblioteca_entity::audit::{AuditAction, AuditEntityType};
use biblioteca_entity::folder::{CreateFolder, Folder, FolderPath};

use super::{placed, required_name};
use crate::audit::AuditRecorder;
use crate::context::SessionContext;

/// Request to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Owning category.
    pub category_id: Uuid,
    /// Parent folder (None for a root folder of the category).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
}

/// Manages folder CRUD operations.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    categories: Arc<dyn CategoryStore>,
    audit: AuditRecorder,
    events: EventBus,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        categories: Arc<dyn CategoryStore>,
        audit: AuditRecorder,
        events: EventBus,
    ) -> Self {
        Self {
            folders,
            categories,
            audit,
            events,
        }
    }

    /// Gets a folder by ID.
    pub async fn get(&self, _ctx: &SessionContext, id: Uuid) -> AppResult<Folder> {
        self.folders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    /// Root folders of a category.
    pub async fn list_roots(
        &self,
        _ctx: &SessionContext,
        category_id: Uuid,
    ) -> AppResult<Vec<Folder>> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(AppError::not_found("Category not found"));
        }
        self.folders.list_roots(category_id).await
    }

    /// Direct sub-folders of a folder.
    pub async fn list_children(&self, ctx: &SessionContext, id: Uuid) -> AppResult<Vec<Folder>> {
        self.get(ctx, id).await?;
        self.folders.list_children(id).await
    }

    /// Breadcrumb from the topmost reachable ancestor down to the folder.
    pub async fn path(&self, _ctx: &SessionContext, id: Uuid) -> AppResult<FolderPath> {
        let segments = self.folders.ancestors(id).await?;
        let Some(top) = segments.first() else {
            return Err(AppError::not_found("Folder not found"));
        };
        Ok(FolderPath {
            category_id: top.category_id,
            truncated: top.parent_id.is_some(),
            segments,
        })
    }

    /// Creates a folder. Any authenticated user may.
    pub async fn create(&self, ctx: &SessionContext, req: CreateFolderRequest) -> AppResult<Folder> {
        let name = required_name(&req.name, "Folder name", 200)?;

        let placement = self
            .folders
            .create(&CreateFolder {
                category_id: req.category_id,
                parent_id: req.parent_id,
                name,
                created_by: ctx.user_id,
            })
            .await?;
        let folder = placed(placement, "Parent folder", "Folder not found")?;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            category_id = %folder.category_id,
            "Folder created"
        );
        self.audit
            .record(ctx, AuditAction::Create, AuditEntityType::Folder, folder.id, &folder.name, "")
            .await;
        self.publish(ctx, &folder);
        Ok(folder)
    }

    /// Renames a folder. Creator, editors, and admins only.
    pub async fn rename(&self, ctx: &SessionContext, id: Uuid, name: &str) -> AppResult<Folder> {
        let name = required_name(name, "Folder name", 200)?;
        let existing = self.get(ctx, id).await?;
        if !can_manage_folder(ctx.role, existing.created_by == ctx.user_id) {
            return Err(AppError::authorization(
                "You do not have permission to modify this folder",
            ));
        }

        let folder = self
            .folders
            .rename(id, &name)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))?;

        info!(user_id = %ctx.user_id, folder_id = %id, "Folder renamed");
        self.audit
            .record(
                ctx,
                AuditAction::Update,
                AuditEntityType::Folder,
                id,
                &folder.name,
                format!("Renamed from '{}'", existing.name),
            )
            .await;
        self.publish(ctx, &folder);
        Ok(folder)
    }

    /// Deletes a folder that no document directly references.
    ///
    /// Sub-folders are not inspected: they survive with a dangling parent
    /// and stay reachable by ID only.
    pub async fn delete(&self, ctx: &SessionContext, id: Uuid) -> AppResult<()> {
        let folder = self.get(ctx, id).await?;
        if !can_delete_folder(ctx.role, folder.created_by == ctx.user_id) {
            return Err(AppError::authorization(
                "You do not have permission to delete this folder",
            ));
        }

        match self.folders.delete_if_empty(id).await? {
            FolderDeletion::Deleted => {}
            FolderDeletion::NotFound => return Err(AppError::not_found("Folder not found")),
            FolderDeletion::HasDocuments(count) => {
                return Err(AppError::hierarchy(format!(
                    "Folder is not empty: it still contains {count} document(s). \
                     Move or delete them first."
                )));
            }
        }

        info!(user_id = %ctx.user_id, folder_id = %id, "Folder deleted");
        self.audit
            .record(ctx, AuditAction::Delete, AuditEntityType::Folder, id, &folder.name, "")
            .await;
        self.publish(ctx, &folder);
        Ok(())
    }

    fn publish(&self, ctx: &SessionContext, folder: &Folder) {
        self.events.publish(
            Some(ctx.user_id),
            EventPayload::Catalog(CatalogEvent::FolderChanged {
                folder_id: folder.id,
                category_id: folder.category_id,
                parent_id: folder.parent_id,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::category::CreateCategoryRequest;
    use crate::catalog::document::CreateDocumentRequest;
    use crate::catalog::testing::{Catalog, catalog, session};
    use biblioteca_core::error::ErrorKind;
    use biblioteca_entity::category::Category;
    use biblioteca_entity::document::Document;
    use biblioteca_entity::user::UserRole;

    async fn category(c: &Catalog, name: &str) -> Category {
        c.categories
            .create(
                &session(UserRole::Admin),
                CreateCategoryRequest {
                    name: name.into(),
                    description: None,
                },
            )
            .await
            .unwrap()
    }

    async fn folder(
        c: &Catalog,
        ctx: &SessionContext,
        category_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> Folder {
        c.folders
            .create(
                ctx,
                CreateFolderRequest {
                    category_id,
                    parent_id,
                    name: name.into(),
                },
            )
            .await
            .unwrap()
    }

    async fn document(c: &Catalog, ctx: &SessionContext, f: &Folder) -> Document {
        c.documents
            .create(ctx, CreateDocumentRequest::new(f.category_id, Some(f.id), "Apuntes", "Ana", "http://lib.test/files/a.pdf"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_non_empty_folder_cannot_be_deleted() {
        let c = catalog().await;
        let admin = session(UserRole::Admin);
        let cat = category(&c, "Historia").await;
        let f = folder(&c, &admin, cat.id, None, "Siglo XX").await;
        document(&c, &admin, &f).await;

        let err = c.folders.delete(&admin, f.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::HierarchyViolation);
        assert!(err.message.starts_with("Folder is not empty"));
        assert!(c.folders.get(&admin, f.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_folder_with_only_subfolders_is_deleted() {
        let c = catalog().await;
        let admin = session(UserRole::Admin);
        let cat = category(&c, "Historia").await;
        let f = folder(&c, &admin, cat.id, None, "F").await;
        let f2 = folder(&c, &admin, cat.id, Some(f.id), "F2").await;
        document(&c, &admin, &f2).await;

        c.folders.delete(&admin, f.id).await.unwrap();

        assert!(c.folders.list_roots(&admin, cat.id).await.unwrap().is_empty());
        let orphan = c.folders.get(&admin, f2.id).await.unwrap();
        assert_eq!(orphan.parent_id, Some(f.id));
        assert_eq!(c.documents.list_in_folder(&admin, f2.id).await.unwrap().len(), 1);

        let path = c.folders.path(&admin, f2.id).await.unwrap();
        assert!(path.truncated);
        assert_eq!(path.segments.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_requires_ownership_or_editor() {
        let c = catalog().await;
        let owner = session(UserRole::User);
        let other = session(UserRole::User);
        let cat = category(&c, "Arte").await;
        let f = folder(&c, &owner, cat.id, None, "Pintura").await;

        let err = c.folders.delete(&other, f.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let err = c.folders.rename(&other, f.id, "Escultura").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        c.folders.rename(&session(UserRole::Editor), f.id, "Escultura").await.unwrap();
        c.folders.delete(&owner, f.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_parent_must_share_category() {
        let c = catalog().await;
        let user = session(UserRole::User);
        let a = category(&c, "A").await;
        let b = category(&c, "B").await;
        let parent = folder(&c, &user, a.id, None, "Raíz").await;

        let err = c
            .folders
            .create(
                &user,
                CreateFolderRequest {
                    category_id: b.id,
                    parent_id: Some(parent.id),
                    name: "Hija".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::HierarchyViolation);
    }

    #[tokio::test]
    async fn test_create_racing_category_delete_leaves_no_orphan() {
        let c = catalog().await;
        let admin = session(UserRole::Admin);
        let user = session(UserRole::User);

        for _ in 0..25 {
            let cat = category(&c, "Efímera").await;
            let (created, deleted) = tokio::join!(
                c.folders.create(
                    &user,
                    CreateFolderRequest {
                        category_id: cat.id,
                        parent_id: None,
                        name: "Notas".into(),
                    },
                ),
                c.categories.delete(&admin, cat.id),
            );

            let category_exists = c.store.categories.find_by_id(cat.id).await.unwrap().is_some();
            match created {
                Ok(folder) => {
                    assert!(category_exists);
                    assert!(deleted.is_err());
                    assert_eq!(folder.category_id, cat.id);
                }
                Err(e) => {
                    assert_eq!(e.kind, ErrorKind::NotFound);
                    assert!(!category_exists);
                    assert!(deleted.is_ok());
                }
            }
        }
    }

    #[tokio::test]
    async fn test_roots_children_and_path() {
        let c = catalog().await;
        let user = session(UserRole::User);
        let cat = category(&c, "Ciencias").await;
        let root = folder(&c, &user, cat.id, None, "Física").await;
        let mid = folder(&c, &user, cat.id, Some(root.id), "Óptica").await;
        let leaf = folder(&c, &user, cat.id, Some(mid.id), "Láseres").await;

        let roots = c.folders.list_roots(&user, cat.id).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id, root.id);
        assert_eq!(c.folders.list_children(&user, root.id).await.unwrap()[0].id, mid.id);

        let path = c.folders.path(&user, leaf.id).await.unwrap();
        assert!(!path.truncated);
        assert_eq!(path.category_id, cat.id);
        let names: Vec<&str> = path.segments.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Física", "Óptica", "Láseres"]);
    }
}

//! Category management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use biblioteca_auth::predicates::can_manage_category;
use biblioteca_core::error::AppError;
use biblioteca_core::events::{CatalogEvent, EventBus, EventPayload};
use biblioteca_core::result::AppResult;
use biblioteca_database::store::{CategoryDeletion, CategoryStore};
use biblioteca_entity::audit::{AuditAction, AuditEntityType};
use biblioteca_entity::category::{Category, CreateCategory, UpdateCategory};

use super::{optional_text, required_name};
use crate::audit::AuditRecorder;
use crate::context::SessionContext;

/// Request to create a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    /// Category name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Manages top-level categories. Mutations are limited to admins and editors.
#[derive(Debug, Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
    audit: AuditRecorder,
    events: EventBus,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(categories: Arc<dyn CategoryStore>, audit: AuditRecorder, events: EventBus) -> Self {
        Self {
            categories,
            audit,
            events,
        }
    }

    /// All categories, ordered by name.
    pub async fn list(&self, _ctx: &SessionContext) -> AppResult<Vec<Category>> {
        self.categories.list_all().await
    }

    /// Gets a category by ID.
    pub async fn get(&self, _ctx: &SessionContext, id: Uuid) -> AppResult<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    /// Creates a category.
    pub async fn create(
        &self,
        ctx: &SessionContext,
        req: CreateCategoryRequest,
    ) -> AppResult<Category> {
        require_manage(ctx)?;
        let name = required_name(&req.name, "Category name", 120)?;

        let category = self
            .categories
            .create(&CreateCategory {
                name,
                description: optional_text(req.description),
                created_by: ctx.user_id,
            })
            .await?;

        info!(user_id = %ctx.user_id, category_id = %category.id, "Category created");
        self.audit
            .record(
                ctx,
                AuditAction::Create,
                AuditEntityType::Category,
                category.id,
                &category.name,
                "",
            )
            .await;
        self.publish(ctx, category.id);
        Ok(category)
    }

    /// Updates name or description.
    pub async fn update(
        &self,
        ctx: &SessionContext,
        id: Uuid,
        mut req: UpdateCategory,
    ) -> AppResult<Category> {
        require_manage(ctx)?;
        if let Some(name) = req.name.as_deref() {
            req.name = Some(required_name(name, "Category name", 120)?);
        }
        req.description = req.description.map(|d| d.trim().to_string());

        let category = self
            .categories
            .update(id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))?;

        info!(user_id = %ctx.user_id, category_id = %id, "Category updated");
        self.audit
            .record(
                ctx,
                AuditAction::Update,
                AuditEntityType::Category,
                category.id,
                &category.name,
                "",
            )
            .await;
        self.publish(ctx, category.id);
        Ok(category)
    }

    /// Deletes a category that no folder or document references.
    pub async fn delete(&self, ctx: &SessionContext, id: Uuid) -> AppResult<()> {
        require_manage(ctx)?;
        let category = self.get(ctx, id).await?;

        match self.categories.delete_if_unused(id).await? {
            CategoryDeletion::Deleted => {}
            CategoryDeletion::NotFound => return Err(AppError::not_found("Category not found")),
            CategoryDeletion::InUse { folders, documents } => {
                return Err(AppError::hierarchy(format!(
                    "Category is not empty: it still contains {folders} folder(s) and \
                     {documents} document(s). Move or delete them first."
                )));
            }
        }

        info!(user_id = %ctx.user_id, category_id = %id, "Category deleted");
        self.audit
            .record(
                ctx,
                AuditAction::Delete,
                AuditEntityType::Category,
                id,
                &category.name,
                "",
            )
            .await;
        self.publish(ctx, id);
        Ok(())
    }

    fn publish(&self, ctx: &SessionContext, category_id: Uuid) {
        self.events.publish(
            Some(ctx.user_id),
            EventPayload::Catalog(CatalogEvent::CategoryChanged { category_id }),
        );
    }
}

fn require_manage(ctx: &SessionContext) -> AppResult<()> {
    if can_manage_category(ctx.role) {
        Ok(())
    } else {
        Err(AppError::authorization(
            "Only administrators and editors can manage categories",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::folder::CreateFolderRequest;
    use crate::catalog::testing::{catalog, session};
    use biblioteca_core::error::ErrorKind;
    use biblioteca_entity::user::UserRole;

    fn req(name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.into(),
            description: Some("  ".into()),
        }
    }

    #[tokio::test]
    async fn test_only_editors_and_admins_manage_categories() {
        let c = catalog().await;
        let user = session(UserRole::User);
        let err = c.categories.create(&user, req("Ingeniería")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let editor = session(UserRole::Editor);
        let category = c.categories.create(&editor, req(" Ingeniería ")).await.unwrap();
        assert_eq!(category.name, "Ingeniería");
        assert!(category.description.is_none());

        let err = c.categories.delete(&user, category.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        c.categories.delete(&session(UserRole::Admin), category.id).await.unwrap();
        assert!(c.categories.list(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let c = catalog().await;
        let err = c
            .categories
            .create(&session(UserRole::Admin), req("   "))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_in_use_category_rejected() {
        let c = catalog().await;
        let admin = session(UserRole::Admin);
        let category = c.categories.create(&admin, req("Derecho")).await.unwrap();
        c.folders
            .create(
                &admin,
                CreateFolderRequest {
                    category_id: category.id,
                    parent_id: None,
                    name: "Civil".into(),
                },
            )
            .await
            .unwrap();

        let err = c.categories.delete(&admin, category.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::HierarchyViolation);
        assert!(c.categories.get(&admin, category.id).await.is_ok());
    }
}

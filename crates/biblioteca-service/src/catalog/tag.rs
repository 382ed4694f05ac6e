//! Tag management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use biblioteca_auth::predicates::can_manage_tags;
use biblioteca_core::error::AppError;
use biblioteca_core::events::{CatalogEvent, EventBus, EventPayload};
use biblioteca_core::result::AppResult;
use biblioteca_database::store::{DocumentStore, TagStore};
use biblioteca_entity::audit::{AuditAction, AuditEntityType};
use biblioteca_entity::tag::Tag;

use super::required_name;
use crate::audit::AuditRecorder;
use crate::context::SessionContext;

/// Manages tags. Anyone may create a tag; renaming and deleting are
/// limited to editors and admins.
#[derive(Debug, Clone)]
pub struct TagService {
    tags: Arc<dyn TagStore>,
    documents: Arc<dyn DocumentStore>,
    audit: AuditRecorder,
    events: EventBus,
}

impl TagService {
    /// Creates a new tag service.
    pub fn new(
        tags: Arc<dyn TagStore>,
        documents: Arc<dyn DocumentStore>,
        audit: AuditRecorder,
        events: EventBus,
    ) -> Self {
        Self {
            tags,
            documents,
            audit,
            events,
        }
    }

    /// All tags, ordered by name.
    pub async fn list(&self, _ctx: &SessionContext) -> AppResult<Vec<Tag>> {
        self.tags.list_all().await
    }

    /// Creates a tag.
    pub async fn create(&self, ctx: &SessionContext, name: &str) -> AppResult<Tag> {
        let name = required_name(name, "Tag name", 60)?;
        let tag = self.tags.create(&name, ctx.user_id).await?;

        info!(user_id = %ctx.user_id, tag_id = %tag.id, "Tag created");
        self.audit
            .record(ctx, AuditAction::Create, AuditEntityType::Tag, tag.id, &tag.name, "")
            .await;
        self.publish(ctx, CatalogEvent::TagsChanged);
        Ok(tag)
    }

    /// Renames a tag.
    pub async fn rename(&self, ctx: &SessionContext, id: Uuid, name: &str) -> AppResult<Tag> {
        require_manage(ctx)?;
        let name = required_name(name, "Tag name", 60)?;
        let tag = self
            .tags
            .rename(id, &name)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found"))?;

        info!(user_id = %ctx.user_id, tag_id = %id, "Tag renamed");
        self.audit
            .record(ctx, AuditAction::Update, AuditEntityType::Tag, id, &tag.name, "")
            .await;
        self.publish(ctx, CatalogEvent::TagsChanged);
        Ok(tag)
    }

    /// Deletes a tag and strips it from every document carrying it.
    pub async fn delete(&self, ctx: &SessionContext, id: Uuid) -> AppResult<()> {
        require_manage(ctx)?;
        let tag = self
            .tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found"))?;

        let document_ids = self.documents.remove_tag(id).await?;
        if !self.tags.delete(id).await? {
            return Err(AppError::not_found("Tag not found"));
        }

        info!(
            user_id = %ctx.user_id,
            tag_id = %id,
            documents = document_ids.len(),
            "Tag deleted"
        );
        self.audit
            .record(
                ctx,
                AuditAction::Delete,
                AuditEntityType::Tag,
                id,
                &tag.name,
                format!("Removed from {} document(s)", document_ids.len()),
            )
            .await;
        if !document_ids.is_empty() {
            self.publish(ctx, CatalogEvent::TagRemovedFromDocuments { document_ids });
        }
        self.publish(ctx, CatalogEvent::TagsChanged);
        Ok(())
    }

    fn publish(&self, ctx: &SessionContext, event: CatalogEvent) {
        self.events
            .publish(Some(ctx.user_id), EventPayload::Catalog(event));
    }
}

fn require_manage(ctx: &SessionContext) -> AppResult<()> {
    if can_manage_tags(ctx.role) {
        Ok(())
    } else {
        Err(AppError::authorization(
            "Only administrators and editors can manage tags",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::category::CreateCategoryRequest;
    use crate::catalog::document::CreateDocumentRequest;
    use crate::catalog::testing::{catalog, session};
    use biblioteca_core::error::ErrorKind;
    use biblioteca_entity::user::UserRole;

    #[tokio::test]
    async fn test_duplicate_names_conflict() {
        let c = catalog().await;
        let user = session(UserRole::User);
        c.tags.create(&user, "Tesis").await.unwrap();
        let err = c.tags.create(&user, "tesis").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_delete_strips_tag_from_documents() {
        let c = catalog().await;
        let editor = session(UserRole::Editor);
        let cat = c
            .categories
            .create(
                &editor,
                CreateCategoryRequest {
                    name: "Economía".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        let keep = c.tags.create(&editor, "Macro").await.unwrap();
        let gone = c.tags.create(&editor, "Obsoleto").await.unwrap();
        let mut req = CreateDocumentRequest::new(cat.id, None, "Inflación", "Keynes", "https://x.org/i.pdf");
        req.tag_ids = vec![keep.id, gone.id, gone.id];
        let doc = c.documents.create(&editor, req).await.unwrap();
        assert_eq!(doc.tag_ids, vec![keep.id, gone.id]);

        let err = c.tags.delete(&session(UserRole::User), gone.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        c.tags.delete(&editor, gone.id).await.unwrap();
        let doc = c.documents.get(&editor, doc.id).await.unwrap();
        assert_eq!(doc.tag_ids, vec![keep.id]);
        assert_eq!(c.tags.list(&editor).await.unwrap().len(), 1);
    }
}

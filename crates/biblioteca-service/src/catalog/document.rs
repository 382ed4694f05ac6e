//! Document operations: metadata, moves, deletion, and search.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use biblioteca_auth::predicates::{can_delete_document, can_manage_document, can_view_document};
use biblioteca_core::error::AppError;
use biblioteca_core::events::{CatalogEvent, EventBus, EventPayload};
use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_database::store::{CategoryStore, DocumentStore, FolderStore, TagStore};
use biblioteca_entity::audit::{AuditAction, AuditEntityType};
use biblioteca_entity::category::Category;
use biblioteca_entity::document::{CreateDocument, Document, DocumentSearch, UpdateDocument};
use biblioteca_entity::folder::Folder;
use biblioteca_storage::ObjectStore;

use super::{optional_text, placed, required_name};
use crate::audit::AuditRecorder;
use crate::context::SessionContext;

/// Default number of search hits.
const DEFAULT_SEARCH_LIMIT: u64 = 50;
/// Maximum number of search hits.
const MAX_SEARCH_LIMIT: u64 = 200;

/// Request to create a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    /// Owning category.
    pub category_id: Uuid,
    /// Containing folder, or None for a root document.
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Author.
    pub author: String,
    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Subject.
    #[serde(default)]
    pub subject: Option<String>,
    /// Version label.
    #[serde(default)]
    pub version: Option<String>,
    /// URL of the uploaded file.
    pub file_url: String,
    /// URL of the thumbnail.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

impl CreateDocumentRequest {
    /// A request with only the required fields set.
    pub fn new(
        category_id: Uuid,
        folder_id: Option<Uuid>,
        title: &str,
        author: &str,
        file_url: &str,
    ) -> Self {
        Self {
            category_id,
            folder_id,
            title: title.to_string(),
            author: author.to_string(),
            year: None,
            description: None,
            subject: None,
            version: None,
            file_url: file_url.to_string(),
            thumbnail_url: None,
            tag_ids: Vec::new(),
        }
    }
}

/// Request to move a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveDocumentRequest {
    /// Target category.
    pub category_id: Uuid,
    /// Target folder inside that category, or None for the category root.
    #[serde(default)]
    pub folder_id: Option<Uuid>,
}

/// Manages documents.
#[derive(Debug, Clone)]
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    categories: Arc<dyn CategoryStore>,
    folders: Arc<dyn FolderStore>,
    tags: Arc<dyn TagStore>,
    objects: ObjectStore,
    audit: AuditRecorder,
    events: EventBus,
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        categories: Arc<dyn CategoryStore>,
        folders: Arc<dyn FolderStore>,
        tags: Arc<dyn TagStore>,
        objects: ObjectStore,
        audit: AuditRecorder,
        events: EventBus,
    ) -> Self {
        Self {
            documents,
            categories,
            folders,
            tags,
            objects,
            audit,
            events,
        }
    }

    /// All documents, most recently updated first.
    pub async fn list(
        &self,
        _ctx: &SessionContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        self.documents.list(page).await
    }

    /// Gets a document by ID.
    pub async fn get(&self, ctx: &SessionContext, id: Uuid) -> AppResult<Document> {
        if !can_view_document(ctx.role) {
            return Err(AppError::authorization("You cannot view this document"));
        }
        self.documents
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))
    }

    /// Root documents of a category.
    pub async fn list_root(
        &self,
        _ctx: &SessionContext,
        category_id: Uuid,
    ) -> AppResult<Vec<Document>> {
        self.category(category_id).await?;
        self.documents.list_root(category_id).await
    }

    /// Documents directly inside a folder.
    pub async fn list_in_folder(
        &self,
        _ctx: &SessionContext,
        folder_id: Uuid,
    ) -> AppResult<Vec<Document>> {
        self.folder(folder_id).await?;
        self.documents.list_in_folder(folder_id).await
    }

    /// Case-insensitive search over title, author, subject, and description.
    pub async fn search(
        &self,
        _ctx: &SessionContext,
        mut search: DocumentSearch,
    ) -> AppResult<Vec<Document>> {
        search.query = search.query.trim().to_string();
        if search.query.chars().count() > 200 {
            return Err(AppError::validation(
                "Search query must be at most 200 characters",
            ));
        }
        search.limit = match search.limit {
            0 => DEFAULT_SEARCH_LIMIT,
            n => n.min(MAX_SEARCH_LIMIT),
        };
        self.documents.search(&search).await
    }

    /// Creates a document. Any authenticated user may.
    pub async fn create(
        &self,
        ctx: &SessionContext,
        req: CreateDocumentRequest,
    ) -> AppResult<Document> {
        let title = required_name(&req.title, "Title", 300)?;
        let author = required_name(&req.author, "Author", 200)?;
        let file_url = required_name(&req.file_url, "File URL", 2048)?;
        validate_year(req.year)?;
        let tag_ids = self.validated_tags(req.tag_ids).await?;

        let placement = self
            .documents
            .create(&CreateDocument {
                category_id: req.category_id,
                folder_id: req.folder_id,
                title,
                author,
                year: req.year,
                description: optional_text(req.description),
                subject: optional_text(req.subject),
                version: optional_text(req.version),
                file_url,
                thumbnail_url: optional_text(req.thumbnail_url),
                tag_ids,
                created_by: ctx.user_id,
            })
            .await?;
        let document = placed(placement, "Folder", "Document not found")?;

        info!(
            user_id = %ctx.user_id,
            document_id = %document.id,
            category_id = %document.category_id,
            "Document created"
        );
        self.audit
            .record(
                ctx,
                AuditAction::Create,
                AuditEntityType::Document,
                document.id,
                &document.title,
                "",
            )
            .await;
        self.publish_changed(ctx, &document);
        Ok(document)
    }

    /// Updates document metadata. Creator, editors, and admins only.
    pub async fn update(
        &self,
        ctx: &SessionContext,
        id: Uuid,
        mut req: UpdateDocument,
    ) -> AppResult<Document> {
        let existing = self.get(ctx, id).await?;
        if !can_manage_document(ctx.role, existing.is_owned_by(ctx.user_id)) {
            return Err(AppError::authorization(
                "You do not have permission to modify this document",
            ));
        }

        if let Some(title) = req.title.as_deref() {
            req.title = Some(required_name(title, "Title", 300)?);
        }
        if let Some(author) = req.author.as_deref() {
            req.author = Some(required_name(author, "Author", 200)?);
        }
        if let Some(url) = req.file_url.as_deref() {
            req.file_url = Some(required_name(url, "File URL", 2048)?);
        }
        validate_year(req.year)?;
        if let Some(tag_ids) = req.tag_ids.take() {
            req.tag_ids = Some(self.validated_tags(tag_ids).await?);
        }

        let document = self
            .documents
            .update(id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        info!(user_id = %ctx.user_id, document_id = %id, "Document updated");
        self.audit
            .record(
                ctx,
                AuditAction::Update,
                AuditEntityType::Document,
                id,
                &document.title,
                "",
            )
            .await;
        self.publish_changed(ctx, &document);
        Ok(document)
    }

    /// Moves a document to another category/folder in a single write.
    ///
    /// The target folder must belong to the target category.
    pub async fn move_document(
        &self,
        ctx: &SessionContext,
        id: Uuid,
        req: MoveDocumentRequest,
    ) -> AppResult<Document> {
        let existing = self.get(ctx, id).await?;
        if !can_manage_document(ctx.role, existing.is_owned_by(ctx.user_id)) {
            return Err(AppError::authorization(
                "You do not have permission to move this document",
            ));
        }
        let placement = self
            .documents
            .move_to(id, req.category_id, req.folder_id)
            .await?;
        let document = placed(placement, "Folder", "Document not found")?;

        info!(
            user_id = %ctx.user_id,
            document_id = %id,
            from_category_id = %existing.category_id,
            to_category_id = %document.category_id,
            "Document moved"
        );

        let destination = format!("Moved to {}", self.location_label(&document).await?);
        self.audit
            .record(
                ctx,
                AuditAction::Update,
                AuditEntityType::Document,
                id,
                &document.title,
                destination,
            )
            .await;
        self.events.publish(
            Some(ctx.user_id),
            EventPayload::Catalog(CatalogEvent::DocumentMoved {
                document_id: id,
                from_category_id: existing.category_id,
                from_folder_id: existing.folder_id,
                to_category_id: document.category_id,
                to_folder_id: document.folder_id,
            }),
        );
        Ok(document)
    }

    /// Deletes a document and, best effort, its stored file and thumbnail.
    pub async fn delete(&self, ctx: &SessionContext, id: Uuid) -> AppResult<()> {
        let existing = self.get(ctx, id).await?;
        if !can_delete_document(ctx.role, existing.is_owned_by(ctx.user_id)) {
            return Err(AppError::authorization(
                "You do not have permission to delete this document",
            ));
        }

        let document = self
            .documents
            .delete(id)
            .await?
            .ok_or_else(|| AppError::not_found("Document not found"))?;

        for url in std::iter::once(&document.file_url).chain(document.thumbnail_url.as_ref()) {
            if let Err(e) = self.objects.delete_by_url(url).await {
                warn!(document_id = %id, url = %url, error = %e, "Failed to delete stored file");
            }
        }

        info!(user_id = %ctx.user_id, document_id = %id, "Document deleted");
        self.audit
            .record(
                ctx,
                AuditAction::Delete,
                AuditEntityType::Document,
                id,
                &document.title,
                "",
            )
            .await;
        self.publish_changed(ctx, &document);
        Ok(())
    }

    /// "Category / Folder" for audit details. Names are read after the
    /// write; a location deleted since then falls back to its ID.
    async fn location_label(&self, document: &Document) -> AppResult<String> {
        let category = match self.categories.find_by_id(document.category_id).await? {
            Some(category) => category.name,
            None => document.category_id.to_string(),
        };
        let Some(folder_id) = document.folder_id else {
            return Ok(category);
        };
        let folder = match self.folders.find_by_id(folder_id).await? {
            Some(folder) => folder.name,
            None => folder_id.to_string(),
        };
        Ok(format!("{category} / {folder}"))
    }

    async fn category(&self, id: Uuid) -> AppResult<Category> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category not found"))
    }

    async fn folder(&self, id: Uuid) -> AppResult<Folder> {
        self.folders
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder not found"))
    }

    async fn validated_tags(&self, tag_ids: Vec<Uuid>) -> AppResult<Vec<Uuid>> {
        let mut unique = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if !unique.is_empty() && self.tags.count_existing(&unique).await? != unique.len() as u64 {
            return Err(AppError::validation("One or more tags do not exist"));
        }
        Ok(unique)
    }

    fn publish_changed(&self, ctx: &SessionContext, document: &Document) {
        self.events.publish(
            Some(ctx.user_id),
            EventPayload::Catalog(CatalogEvent::DocumentChanged {
                document_id: document.id,
                category_id: document.category_id,
                folder_id: document.folder_id,
            }),
        );
    }
}

fn validate_year(year: Option<i32>) -> AppResult<()> {
    match year {
        Some(y) if !(1..=9999).contains(&y) => {
            Err(AppError::validation("Year must be between 1 and 9999"))
        }
        _ => Ok(()),
    }
}

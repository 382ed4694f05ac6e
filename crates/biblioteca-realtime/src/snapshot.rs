//! Loading the current result of a live query.

use async_trait::async_trait;
use serde::Serialize;

use biblioteca_core::error::{AppError, ErrorKind};
use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::PageRequest;
use biblioteca_service::{
    AdminUserService, AuditRecorder, CategoryService, DocumentService, FolderService,
    SessionContext, TagService,
};

use crate::query::LiveQuery;

/// Produces the JSON snapshot of a query for a given session.
#[async_trait]
pub trait SnapshotSource: Send + Sync + std::fmt::Debug + 'static {
    /// Load the full result. Permission and existence errors surface as
    /// the usual [`AppError`] kinds.
    async fn load(&self, session: &SessionContext, query: &LiveQuery)
    -> AppResult<serde_json::Value>;
}

/// Snapshots served by the catalog, user, and audit services, so every
/// read goes through the same permission checks as the HTTP API.
#[derive(Debug, Clone)]
pub struct ServiceSnapshots {
    categories: CategoryService,
    folders: FolderService,
    documents: DocumentService,
    tags: TagService,
    admin: AdminUserService,
    audit: AuditRecorder,
}

impl ServiceSnapshots {
    /// Creates a snapshot source over the given services.
    pub fn new(
        categories: CategoryService,
        folders: FolderService,
        documents: DocumentService,
        tags: TagService,
        admin: AdminUserService,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            categories,
            folders,
            documents,
            tags,
            admin,
            audit,
        }
    }
}

#[async_trait]
impl SnapshotSource for ServiceSnapshots {
    async fn load(
        &self,
        session: &SessionContext,
        query: &LiveQuery,
    ) -> AppResult<serde_json::Value> {
        let page = PageRequest::default();
        match *query {
            LiveQuery::Categories => to_json(self.categories.list(session).await?),
            LiveQuery::Tags => to_json(self.tags.list(session).await?),
            LiveQuery::CategoryFolders(id) => to_json(self.folders.list_roots(session, id).await?),
            LiveQuery::CategoryDocuments(id) => {
                to_json(self.documents.list_root(session, id).await?)
            }
            LiveQuery::FolderChildren(id) => to_json(self.folders.list_children(session, id).await?),
            LiveQuery::FolderDocuments(id) => {
                to_json(self.documents.list_in_folder(session, id).await?)
            }
            LiveQuery::Document(id) => to_json(self.documents.get(session, id).await?),
            LiveQuery::Users => to_json(self.admin.list_users(session, &page).await?),
            LiveQuery::Audit => to_json(self.audit.list_all(session, &page).await?),
            LiveQuery::AuditMine => to_json(self.audit.list_mine(session, &page).await?),
            LiveQuery::Upload(_) => Ok(serde_json::Value::Null),
        }
    }
}

fn to_json<T: Serialize>(value: T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| {
        AppError::with_source(ErrorKind::Serialization, "Failed to encode snapshot", e)
    })
}

//! Document handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use biblioteca_core::types::pagination::PageResponse;
use biblioteca_entity::document::{Document, DocumentSearch, UpdateDocument};
use biblioteca_service::catalog::{CreateDocumentRequest, MoveDocumentRequest};

use crate::dto::request::SearchQuery;
use crate::dto::response::MessageResponse;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

use super::{ApiResult, ok};

/// GET /api/documents
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PageResponse<Document>> {
    let page = params.into_page_request();
    ok(state.document_service.list(&auth, &page).await?)
}

/// POST /api/documents
pub async fn create_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateDocumentRequest>,
) -> ApiResult<Document> {
    ok(state.document_service.create(&auth, req).await?)
}

/// GET /api/documents/{id}
pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Document> {
    ok(state.document_service.get(&auth, id).await?)
}

/// PUT /api/documents/{id}
pub async fn update_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDocument>,
) -> ApiResult<Document> {
    ok(state.document_service.update(&auth, id, req).await?)
}

/// PUT /api/documents/{id}/move
pub async fn move_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MoveDocumentRequest>,
) -> ApiResult<Document> {
    ok(state.document_service.move_document(&auth, id, req).await?)
}

/// DELETE /api/documents/{id}
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.document_service.delete(&auth, id).await?;
    ok(MessageResponse::new("Document deleted"))
}

/// GET /api/documents/search?q=
pub async fn search_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Document>> {
    let search = DocumentSearch {
        query: query.q,
        category_id: query.category_id,
        tag_id: query.tag_id,
        limit: query.limit.unwrap_or(0),
    };
    ok(state.document_service.search(&auth, search).await?)
}

//! Folder handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use biblioteca_entity::document::Document;
use biblioteca_entity::folder::{Folder, FolderPath};
use biblioteca_service::catalog::CreateFolderRequest;

use crate::dto::request::NameRequest;
use crate::dto::response::MessageResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

use super::{ApiResult, ok};

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<Folder> {
    ok(state.folder_service.create(&auth, req).await?)
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Folder> {
    ok(state.folder_service.get(&auth, id).await?)
}

/// PUT /api/folders/{id}
pub async fn rename_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<NameRequest>,
) -> ApiResult<Folder> {
    ok(state.folder_service.rename(&auth, id, &req.name).await?)
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.folder_service.delete(&auth, id).await?;
    ok(MessageResponse::new("Folder deleted"))
}

/// GET /api/folders/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Folder>> {
    ok(state.folder_service.list_children(&auth, id).await?)
}

/// GET /api/folders/{id}/documents
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Document>> {
    ok(state.document_service.list_in_folder(&auth, id).await?)
}

/// GET /api/folders/{id}/path
pub async fn get_path(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<FolderPath> {
    ok(state.folder_service.path(&auth, id).await?)
}

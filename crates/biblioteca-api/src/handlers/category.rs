//! Category handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use biblioteca_entity::category::{Category, UpdateCategory};
use biblioteca_entity::document::Document;
use biblioteca_entity::folder::Folder;
use biblioteca_service::catalog::CreateCategoryRequest;

use crate::dto::response::MessageResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

use super::{ApiResult, ok};

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Vec<Category>> {
    ok(state.category_service.list(&auth).await?)
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Category> {
    ok(state.category_service.get(&auth, id).await?)
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<Category> {
    ok(state.category_service.create(&auth, req).await?)
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCategory>,
) -> ApiResult<Category> {
    ok(state.category_service.update(&auth, id, req).await?)
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.category_service.delete(&auth, id).await?;
    ok(MessageResponse::new("Category deleted"))
}

/// GET /api/categories/{id}/folders
pub async fn list_root_folders(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Folder>> {
    ok(state.folder_service.list_roots(&auth, id).await?)
}

/// GET /api/categories/{id}/documents
pub async fn list_root_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Document>> {
    ok(state.document_service.list_root(&auth, id).await?)
}

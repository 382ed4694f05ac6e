//! Tag handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use biblioteca_entity::tag::Tag;

use crate::dto::request::NameRequest;
use crate::dto::response::MessageResponse;
use crate::extractors::AuthUser;
use crate::state::AppState;

use super::{ApiResult, ok};

/// GET /api/tags
pub async fn list_tags(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<Tag>> {
    ok(state.tag_service.list(&auth).await?)
}

/// POST /api/tags
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NameRequest>,
) -> ApiResult<Tag> {
    ok(state.tag_service.create(&auth, &req.name).await?)
}

/// PUT /api/tags/{id}
pub async fn rename_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<NameRequest>,
) -> ApiResult<Tag> {
    ok(state.tag_service.rename(&auth, id, &req.name).await?)
}

/// DELETE /api/tags/{id}
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<MessageResponse> {
    state.tag_service.delete(&auth, id).await?;
    ok(MessageResponse::new("Tag deleted"))
}

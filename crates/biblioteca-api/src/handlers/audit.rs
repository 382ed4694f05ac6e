//! Audit log handlers.

use axum::extract::{Path, Query, State};
use uuid::Uuid;

use biblioteca_core::types::pagination::PageResponse;
use biblioteca_entity::audit::AuditLogEntry;

use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

use super::{ApiResult, ok};

/// GET /api/audit
pub async fn list_all(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PageResponse<AuditLogEntry>> {
    let page = params.into_page_request();
    ok(state.audit.list_all(&auth, &page).await?)
}

/// GET /api/audit/me
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PageResponse<AuditLogEntry>> {
    let page = params.into_page_request();
    ok(state.audit.list_mine(&auth, &page).await?)
}

/// GET /api/audit/users/{id}
pub async fn list_for_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PageResponse<AuditLogEntry>> {
    let page = params.into_page_request();
    ok(state.audit.list_for_actor(&auth, id, &page).await?)
}

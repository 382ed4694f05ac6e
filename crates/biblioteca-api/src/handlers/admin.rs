//! Role assignment and principal listing.

use axum::Json;
use axum::extract::{Query, State};

use biblioteca_core::types::pagination::PageResponse;
use biblioteca_entity::user::User;
use biblioteca_service::user::{PrincipalRecord, SetRoleRequest, SetRoleResponse};

use crate::dto::request::PrincipalsQuery;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

use super::{ApiResult, ok};

/// POST /api/callable/set-role
///
/// Missing `uid` or `role` fields deserialize as empty strings so the
/// service reports them as validation errors rather than a 422.
pub async fn set_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SetRoleRequest>,
) -> ApiResult<SetRoleResponse> {
    ok(state
        .admin_user_service
        .set_role(&auth, &req.uid, &req.role)
        .await?)
}

/// GET /api/admin/principals?limit=N
pub async fn list_principals(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PrincipalsQuery>,
) -> ApiResult<Vec<PrincipalRecord>> {
    ok(state
        .admin_user_service
        .list_principals(&auth, query.limit)
        .await?)
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PageResponse<User>> {
    let page = params.into_page_request();
    ok(state.admin_user_service.list_users(&auth, &page).await?)
}

//! Registration, sign-in, refresh, and identity handlers.

use axum::Json;
use axum::extract::State;

use biblioteca_service::identity::{AuthSession, RegisterRequest};
use biblioteca_service::ResolvedIdentity;

use crate::dto::request::{LoginRequest, RefreshRequest};
use crate::extractors::AuthUser;
use crate::state::AppState;

use super::{ApiResult, ok};

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<AuthSession> {
    ok(state.auth_service.register(req).await?)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthSession> {
    ok(state.auth_service.login(&req.email, &req.password).await?)
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<AuthSession> {
    ok(state.auth_service.refresh(&req.token).await?)
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<ResolvedIdentity> {
    ok(state.auth_service.me(&auth).await?)
}

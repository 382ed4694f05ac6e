//! Own-profile handlers.

use axum::Json;
use axum::extract::State;

use biblioteca_entity::user::{UpdateProfile, User};

use crate::extractors::AuthUser;
use crate::state::AppState;

use super::{ApiResult, ok};

/// GET /api/users/me
pub async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> ApiResult<User> {
    ok(state.user_service.get_profile(&auth).await?)
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfile>,
) -> ApiResult<User> {
    ok(state.user_service.update_profile(&auth, req).await?)
}

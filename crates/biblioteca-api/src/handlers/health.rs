//! Health check handler.

use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

use super::{ApiResult, ok};

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthResponse> {
    let database_ok = state.store.health_check().await.unwrap_or(false);
    let storage_ok = state.objects.health_check().await.unwrap_or(false);
    let status = if database_ok && storage_ok { "ok" } else { "degraded" };

    ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: state.store.provider_name().to_string(),
        database_ok,
        storage_ok,
        ws_connections: state.realtime.connection_count(),
    })
}

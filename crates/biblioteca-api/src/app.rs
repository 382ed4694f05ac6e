//! Application builder: wires stores, services, and the router together
//! and runs the server.

use std::time::Duration;

use axum::Router;
use tracing::info;

use biblioteca_core::config::AppConfig;
use biblioteca_core::error::AppError;
use biblioteca_database::DataStore;
use biblioteca_storage::ObjectStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the Biblioteca server until `shutdown` resolves.
pub async fn run_server(
    config: AppConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    info!("Starting Biblioteca server...");

    // ── Step 1: Stores ───────────────────────────────────────────
    let store = DataStore::connect(&config.database).await?;

    // ── Step 2: Object storage ───────────────────────────────────
    let objects = ObjectStore::from_config(&config.storage).await?;

    // ── Step 3: Services and live queries ────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, store.clone(), objects);
    let engine = state.realtime.clone();
    let engine_task = engine.start(&state.events);

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "Biblioteca server listening");

    axum::serve(listener, app)
    .with_graceful_shutdown(async move {
        shutdown.await;
        info!("Shutdown signal received, starting graceful shutdown...");
    })
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Drain background tasks ───────────────────────────
    engine.shutdown();
    let _ = tokio::time::timeout(grace, engine_task).await;
    store.close().await;

    info!("Biblioteca server shut down gracefully");
    Ok(())
}

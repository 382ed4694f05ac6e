//! Route definitions for the Biblioteca HTTP API.
//!
//! JSON routes are mounted under `/api`; stored files are served under
//! `/files` and live queries under `/ws`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room for multipart boundaries and metadata fields on top of the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = (state.config.storage.max_upload_size_bytes as usize)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(admin_routes())
        .merge(category_routes())
        .merge(folder_routes())
        .merge(document_routes())
        .merge(tag_routes())
        .merge(upload_routes())
        .merge(audit_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .route("/files/{*path}", get(handlers::files::download))
        .route("/ws", get(handlers::ws::ws_upgrade))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Registration, sign-in, refresh, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
}

/// Own profile
fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/me",
        get(handlers::user::get_profile).put(handlers::user::update_profile),
    )
}

/// Role assignment and principal listing
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/callable/set-role", post(handlers::admin::set_role))
        .route("/admin/principals", get(handlers::admin::list_principals))
        .route("/admin/users", get(handlers::admin::list_users))
}

/// Categories and their root contents
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::category::list_categories).post(handlers::category::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::category::get_category)
                .put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        .route(
            "/categories/{id}/folders",
            get(handlers::category::list_root_folders),
        )
        .route(
            "/categories/{id}/documents",
            get(handlers::category::list_root_documents),
        )
}

/// Folders and their contents
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::rename_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/children", get(handlers::folder::list_children))
        .route("/folders/{id}/documents", get(handlers::folder::list_documents))
        .route("/folders/{id}/path", get(handlers::folder::get_path))
}

/// Documents, move, search
fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/documents",
            get(handlers::document::list_documents).post(handlers::document::create_document),
        )
        .route("/documents/search", get(handlers::document::search_documents))
        .route(
            "/documents/{id}",
            get(handlers::document::get_document)
                .put(handlers::document::update_document)
                .delete(handlers::document::delete_document),
        )
        .route("/documents/{id}/move", put(handlers::document::move_document))
}

/// Tags
fn tag_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tags",
            get(handlers::tag::list_tags).post(handlers::tag::create_tag),
        )
        .route(
            "/tags/{id}",
            put(handlers::tag::rename_tag).delete(handlers::tag::delete_tag),
        )
}

/// File uploads
fn upload_routes() -> Router<AppState> {
    Router::new().route("/uploads", post(handlers::upload::upload_file))
}

/// Audit log
fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/audit", get(handlers::audit::list_all))
        .route("/audit/me", get(handlers::audit::list_mine))
        .route("/audit/users/{id}", get(handlers::audit::list_for_user))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

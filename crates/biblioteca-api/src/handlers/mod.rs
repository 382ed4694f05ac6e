//! Route handlers organized by domain.

pub mod admin;
pub mod audit;
pub mod auth;
pub mod category;
pub mod document;
pub mod files;
pub mod folder;
pub mod health;
pub mod tag;
pub mod upload;
pub mod user;
pub mod ws;

use axum::Json;
use serde::Serialize;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;

/// Result of a JSON handler.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wraps `data` in the success envelope.
pub(crate) fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

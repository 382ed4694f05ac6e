//! Serving stored objects by URL.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;

use biblioteca_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /files/{*path}
///
/// Stored objects are retrievable by anyone holding their URL, the way
/// document `file_url`s are shared.
pub async fn download(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let (meta, stream) = state.upload_service.download(&path).await?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, meta.size_bytes)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

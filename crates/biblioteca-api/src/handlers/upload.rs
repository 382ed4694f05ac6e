//! Multipart upload handler.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use bytes::Bytes;
use tokio::sync::mpsc;
use uuid::Uuid;

use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_core::traits::storage::ByteStream;
use biblioteca_service::SessionContext;
use biblioteca_service::upload::{UploadRequest, UploadResult};

use crate::extractors::AuthUser;
use crate::state::AppState;

use super::{ApiResult, ok};

/// Chunks buffered between the request body and storage.
const UPLOAD_CHANNEL_DEPTH: usize = 8;

/// POST /api/uploads
///
/// Optional `upload_id` and `total_bytes` fields must precede the `file`
/// field; anything after `file` is ignored. Progress is published under
/// `upload:{upload_id}` while the body streams.
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<UploadResult> {
    let mut req = UploadRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "upload_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                let id = Uuid::parse_str(text.trim())
                    .map_err(|_| AppError::validation("upload_id must be a UUID"))?;
                req.upload_id = Some(id);
            }
            "total_bytes" => {
                let text = field.text().await.map_err(multipart_error)?;
                let total = text
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| AppError::validation("total_bytes must be a non-negative integer"))?;
                req.total_bytes = Some(total);
            }
            "file" => {
                req.file_name = field.file_name().unwrap_or("file").to_string();
                req.content_type = field.content_type().map(str::to_string);
                return ok(stream_field(&state, &auth, req, field).await?);
            }
            _ => {}
        }
    }

    Err(AppError::validation("Missing 'file' field").into())
}

/// Pipe a multipart field into the upload service without buffering the
/// whole file.
async fn stream_field(
    state: &AppState,
    ctx: &SessionContext,
    req: UploadRequest,
    mut field: Field<'_>,
) -> AppResult<UploadResult> {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(UPLOAD_CHANNEL_DEPTH);
    let body: ByteStream = Box::pin(futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|item| (item, rx))
    }));

    let service = state.upload_service.clone();
    let upload_ctx = ctx.clone();
    let upload = tokio::spawn(async move { service.upload(&upload_ctx, req, body).await });

    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                // A closed receiver means storage already gave up (size limit).
                if tx.send(Ok(chunk)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let _ = tx.send(Err(std::io::Error::other(e.to_string()))).await;
                break;
            }
        }
    }
    drop(tx);

    upload
        .await
        .map_err(|e| AppError::internal(format!("Upload task failed: {e}")))?
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::validation(format!("Multipart error: {}", e.body_text()))
}

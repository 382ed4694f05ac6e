//! Streams uploads into object storage and relays progress to the event bus.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use biblioteca_core::events::{EventBus, EventPayload, UploadEvent};
use biblioteca_core::result::AppResult;
use biblioteca_core::traits::storage::{ByteStream, StorageObjectMeta};
use biblioteca_storage::{ObjectStore, UploadProgress};

use crate::context::SessionContext;

/// Metadata accompanying an upload body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Client-chosen ID for progress subscriptions; generated when absent.
    pub upload_id: Option<Uuid>,
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// Declared size, enabling fractional progress.
    pub total_bytes: Option<u64>,
}

/// A completed upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResult {
    /// The upload's progress channel ID.
    pub upload_id: Uuid,
    /// Durable retrieval URL.
    pub url: String,
    /// Path inside the store.
    pub path: String,
    /// Sanitized file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// Stored size in bytes.
    pub size_bytes: u64,
    /// Hex SHA-256 of the content.
    pub checksum_sha256: String,
}

/// Handles file uploads and downloads.
#[derive(Debug, Clone)]
pub struct UploadService {
    objects: ObjectStore,
    events: EventBus,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(objects: ObjectStore, events: EventBus) -> Self {
        Self { objects, events }
    }

    /// Maximum accepted upload size.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.objects.max_upload_size_bytes()
    }

    /// Store `body` for the caller, publishing progress events while it
    /// streams and a completion or failure event at the end.
    pub async fn upload(
        &self,
        ctx: &SessionContext,
        req: UploadRequest,
        body: ByteStream,
    ) -> AppResult<UploadResult> {
        let upload_id = req.upload_id.unwrap_or_else(Uuid::new_v4);
        let owner_id = ctx.user_id;
        let (tx, mut rx) = watch::channel(UploadProgress::start(req.total_bytes));

        let events = self.events.clone();
        let relay = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let progress = *rx.borrow_and_update();
                events.publish(
                    Some(owner_id),
                    EventPayload::Upload(UploadEvent::Progress {
                        upload_id,
                        owner_id,
                        bytes_written: progress.bytes_written,
                        total_bytes: progress.total_bytes,
                    }),
                );
            }
        });

        let outcome = self
            .objects
            .upload(
                owner_id,
                &req.file_name,
                req.content_type,
                req.total_bytes,
                body,
                &tx,
            )
            .await;

        drop(tx);
        if let Err(e) = relay.await {
            warn!(upload_id = %upload_id, error = %e, "Progress relay task failed");
        }

        match outcome {
            Ok(object) => {
                info!(
                    user_id = %owner_id,
                    upload_id = %upload_id,
                    size_bytes = object.size_bytes,
                    "Upload completed"
                );
                self.events.publish(
                    Some(owner_id),
                    EventPayload::Upload(UploadEvent::Completed {
                        upload_id,
                        owner_id,
                        url: object.url.clone(),
                    }),
                );
                Ok(UploadResult {
                    upload_id,
                    url: object.url,
                    path: object.path,
                    file_name: object.file_name,
                    content_type: object.content_type,
                    size_bytes: object.size_bytes,
                    checksum_sha256: object.checksum_sha256,
                })
            }
            Err(e) => {
                warn!(user_id = %owner_id, upload_id = %upload_id, error = %e, "Upload failed");
                let message = if e.kind.is_backend() {
                    "Upload failed".to_string()
                } else {
                    e.message.clone()
                };
                self.events.publish(
                    Some(owner_id),
                    EventPayload::Upload(UploadEvent::Failed {
                        upload_id,
                        owner_id,
                        message,
                    }),
                );
                Err(e)
            }
        }
    }

    /// Open a stored object by path.
    pub async fn download(&self, path: &str) -> AppResult<(StorageObjectMeta, ByteStream)> {
        self.objects.open(path).await
    }
}

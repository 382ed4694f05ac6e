//! Uploads with progress reporting and public URL mapping.

use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

use biblioteca_core::config::storage::StorageConfig;
use biblioteca_core::error::{AppError, ErrorKind};
use biblioteca_core::result::AppResult;
use biblioteca_core::traits::storage::{ByteStream, StorageObjectMeta, StorageProvider};

use crate::providers::local::LocalStorageProvider;

/// URL segment under which stored objects are served.
pub const FILES_ROUTE: &str = "files";

/// Progress snapshot published while an upload streams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UploadProgress {
    /// Bytes persisted so far.
    pub bytes_written: u64,
    /// Expected total, when declared by the client.
    pub total_bytes: Option<u64>,
    /// Set once the object is fully persisted.
    pub done: bool,
}

impl UploadProgress {
    /// Initial state before any byte is written.
    pub fn start(total_bytes: Option<u64>) -> Self {
        Self {
            bytes_written: 0,
            total_bytes,
            done: false,
        }
    }

    /// Completed fraction in `[0, 1]`, unknown without a declared total.
    pub fn fraction(&self) -> Option<f64> {
        if self.done {
            return Some(1.0);
        }
        match self.total_bytes {
            Some(0) => Some(0.0),
            Some(total) => Some((self.bytes_written as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

/// A persisted object and its retrievable URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    /// Durable retrieval URL.
    pub url: String,
    /// Path inside the provider.
    pub path: String,
    /// Original file name after sanitizing.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: Option<String>,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Hex-encoded SHA-256 of the content.
    pub checksum_sha256: String,
}

/// Object storage facade used by the upload and document services.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    provider: Arc<dyn StorageProvider>,
    public_base_url: String,
    max_upload_size_bytes: u64,
}

impl ObjectStore {
    /// Build the store from configuration using the local provider.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider = LocalStorageProvider::new(&config.root_path).await?;
        info!(root = %config.root_path, base_url = %config.public_base_url, "Object storage ready");
        Ok(Self::new(
            Arc::new(provider),
            &config.public_base_url,
            config.max_upload_size_bytes,
        ))
    }

    /// Build the store around an existing provider.
    pub fn new(
        provider: Arc<dyn StorageProvider>,
        public_base_url: &str,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            provider,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_upload_size_bytes,
        }
    }

    /// Maximum accepted object size.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_bytes
    }

    /// Stream `body` into a new object owned by `owner_id`, publishing
    /// progress on `progress` after every chunk.
    ///
    /// Oversized or interrupted uploads are removed before the error is
    /// returned.
    pub async fn upload(
        &self,
        owner_id: Uuid,
        file_name: &str,
        content_type: Option<String>,
        total_bytes: Option<u64>,
        mut body: ByteStream,
        progress: &watch::Sender<UploadProgress>,
    ) -> AppResult<StoredObject> {
        if let Some(total) = total_bytes {
            if total > self.max_upload_size_bytes {
                return Err(AppError::validation(format!(
                    "File exceeds the maximum upload size of {} bytes",
                    self.max_upload_size_bytes
                )));
            }
        }

        let file_name = sanitize_file_name(file_name);
        let path = format!("{owner_id}/{}-{file_name}", Uuid::new_v4());
        let mut hasher = Sha256::new();
        let mut state = UploadProgress::start(total_bytes);
        progress.send_replace(state);

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    self.discard(&path).await;
                    return Err(AppError::with_source(
                        ErrorKind::Storage,
                        "Upload stream interrupted",
                        e,
                    ));
                }
            };
            state.bytes_written += chunk.len() as u64;
            if state.bytes_written > self.max_upload_size_bytes {
                self.discard(&path).await;
                return Err(AppError::validation(format!(
                    "File exceeds the maximum upload size of {} bytes",
                    self.max_upload_size_bytes
                )));
            }
            hasher.update(&chunk);
            if let Err(e) = self.provider.append(&path, chunk).await {
                self.discard(&path).await;
                return Err(e);
            }
            progress.send_replace(state);
        }

        if state.bytes_written == 0 {
            // Zero-length uploads never hit append; create the object explicitly.
            self.provider.write(&path, bytes::Bytes::new()).await?;
        }

        state.done = true;
        progress.send_replace(state);

        let checksum_sha256 = hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>();

        info!(
            owner_id = %owner_id,
            path = %path,
            size_bytes = state.bytes_written,
            "Object stored"
        );

        Ok(StoredObject {
            url: self.url_for(&path),
            path,
            file_name,
            content_type,
            size_bytes: state.bytes_written,
            checksum_sha256,
        })
    }

    /// Open a stored object for reading.
    pub async fn open(&self, path: &str) -> AppResult<(StorageObjectMeta, ByteStream)> {
        let meta = self.provider.metadata(path).await?;
        let stream = self.provider.read(path).await?;
        Ok((meta, stream))
    }

    /// Public URL of a stored path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{FILES_ROUTE}/{path}", self.public_base_url)
    }

    /// Stored path behind a URL, if the URL points into this store.
    pub fn path_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{FILES_ROUTE}/", self.public_base_url);
        url.strip_prefix(&prefix)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
    }

    /// Delete the object behind `url` when it lives in this store.
    /// Returns `false` for foreign URLs.
    pub async fn delete_by_url(&self, url: &str) -> AppResult<bool> {
        match self.path_from_url(url) {
            Some(path) => {
                self.provider.delete(&path).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Check the underlying provider.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }

    async fn discard(&self, path: &str) {
        if let Err(e) = self.provider.delete(path).await {
            warn!(path, error = %e, "Failed to remove partial upload");
        }
    }
}

/// Reduce a client-supplied file name to a safe single path segment.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.chars().take(128).collect()
    }
}

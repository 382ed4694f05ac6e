//! Storage provider trait for uploaded-file backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageObjectMeta {
    /// Path within the storage provider.
    pub path: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// A byte stream type used for reading and writing object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for object storage backends.
///
/// Defined here so services can depend on the abstraction; the local
/// filesystem implementation lives in `biblioteca-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read an object and return its byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Write bytes to an object at the given path.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Append a chunk to an object, creating it when absent.
    async fn append(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete the object at the given path.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Get metadata about an object.
    async fn metadata(&self, path: &str) -> AppResult<StorageObjectMeta>;
}

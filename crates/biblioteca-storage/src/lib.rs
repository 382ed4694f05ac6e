//! # biblioteca-storage
//!
//! Durable storage for uploaded documents and thumbnails. The local
//! filesystem provider implements
//! [`StorageProvider`](biblioteca_core::traits::StorageProvider);
//! [`ObjectStore`] adds streaming uploads with progress reporting and the
//! mapping between stored paths and public URLs.

pub mod object;
pub mod providers;

pub use object::{ObjectStore, StoredObject, UploadProgress};
pub use providers::local::LocalStorageProvider;

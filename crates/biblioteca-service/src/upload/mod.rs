//! File uploads with progress reporting.

pub mod service;

pub use service::{UploadRequest, UploadResult, UploadService};

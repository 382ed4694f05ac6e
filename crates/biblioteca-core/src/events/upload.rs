//! Upload progress events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress reported while a file upload is streamed to storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UploadEvent {
    /// More bytes were written.
    Progress {
        /// Client-visible upload ID.
        upload_id: Uuid,
        /// Uploading user.
        owner_id: Uuid,
        /// Bytes written so far.
        bytes_written: u64,
        /// Expected total, when the client declared one.
        total_bytes: Option<u64>,
    },
    /// The upload finished and the object is retrievable at `url`.
    Completed {
        /// Client-visible upload ID.
        upload_id: Uuid,
        /// Uploading user.
        owner_id: Uuid,
        /// Durable retrieval URL.
        url: String,
    },
    /// The upload was aborted.
    Failed {
        /// Client-visible upload ID.
        upload_id: Uuid,
        /// Uploading user.
        owner_id: Uuid,
        /// Reason shown to the client.
        message: String,
    },
}

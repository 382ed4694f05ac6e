//! Inbound and outbound WebSocket frame definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Frames sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Start watching a live query.
    Subscribe {
        /// Query name, e.g. `folder:{id}:documents`.
        query: String,
    },
    /// Stop watching a live query.
    Unsubscribe {
        /// Query name.
        query: String,
    },
    /// Keep-alive answer to a server ping.
    Pong {
        /// Echoed timestamp.
        timestamp: i64,
    },
}

/// Frames sent by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Subscription confirmed.
    Subscribed {
        /// Query name.
        query: String,
    },
    /// Subscription removed.
    Unsubscribed {
        /// Query name.
        query: String,
    },
    /// Full current result of a query. Replaces any earlier snapshot.
    Snapshot {
        /// Query name.
        query: String,
        /// Monotonic across the server; older versions can be discarded.
        version: u64,
        /// The result set.
        data: serde_json::Value,
        /// When the snapshot was loaded.
        timestamp: DateTime<Utc>,
    },
    /// Upload progress.
    UploadProgress {
        /// Upload ID.
        upload_id: Uuid,
        /// Bytes persisted so far.
        bytes_written: u64,
        /// Declared total, if any.
        total_bytes: Option<u64>,
        /// Completed percentage, when the total is known.
        percent: Option<u8>,
    },
    /// Upload finished.
    UploadCompleted {
        /// Upload ID.
        upload_id: Uuid,
        /// Durable retrieval URL.
        url: String,
    },
    /// Upload aborted.
    UploadFailed {
        /// Upload ID.
        upload_id: Uuid,
        /// Reason.
        message: String,
    },
    /// A request could not be served.
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable message.
        message: String,
        /// Query the error refers to, if any.
        #[serde(skip_serializing_if = "Option::is_none")]
        query: Option<String>,
    },
    /// Keep-alive.
    Ping {
        /// Server time in milliseconds.
        timestamp: i64,
    },
}

impl OutboundMessage {
    /// Error frame, optionally tied to a query.
    pub fn error(code: &str, message: impl Into<String>, query: Option<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
            query,
        }
    }

    /// Final frame for a socket whose token no longer matches the
    /// principal's claims.
    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::error(SESSION_EXPIRED, message, None)
    }

    /// Whether the socket must be closed once this frame is written.
    pub fn closes_connection(&self) -> bool {
        matches!(self, Self::Error { code, .. } if code == SESSION_EXPIRED)
    }
}

const SESSION_EXPIRED: &str = "SESSION_EXPIRED";

/// Percentage in `0..=100`, unknown without a declared total.
pub fn percent(bytes_written: u64, total_bytes: Option<u64>) -> Option<u8> {
    match total_bytes {
        Some(0) => Some(100),
        Some(total) => Some(((bytes_written.min(total) * 100) / total) as u8),
        None => None,
    }
}

//! Domain events emitted by Biblioteca operations.
//!
//! Services publish events on the [`EventBus`] after a mutation commits;
//! the live-query engine consumes them to decide which snapshots to
//! re-send.

pub mod bus;
pub mod catalog;
pub mod upload;
pub mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use bus::EventBus;
pub use catalog::CatalogEvent;
pub use upload::UploadEvent;
pub use user::UserEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<Uuid>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A category, folder, document, or tag changed.
    Catalog(CatalogEvent),
    /// A user profile or role changed.
    User(UserEvent),
    /// An audit entry was appended.
    AuditRecorded {
        /// Sequence number of the new entry.
        seq: i64,
        /// Actor the entry is indexed under.
        actor_id: Uuid,
    },
    /// Upload progress was reported.
    Upload(UploadEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<Uuid>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}

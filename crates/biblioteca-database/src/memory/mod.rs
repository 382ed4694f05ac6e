//! Process-local store used for development and tests.
//!
//! A single [`MemoryStore`] implements every store trait over one lock, so
//! the conditional deletes see a consistent view of folders and documents.

mod accounts;
mod audit;
mod catalog;

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use biblioteca_entity::audit::AuditLogEntry;
use biblioteca_entity::category::Category;
use biblioteca_entity::document::Document;
use biblioteca_entity::folder::Folder;
use biblioteca_entity::identity::Identity;
use biblioteca_entity::tag::Tag;
use biblioteca_entity::user::User;

/// In-memory implementation of all store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    identities: HashMap<Uuid, Identity>,
    profiles: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    folders: HashMap<Uuid, Folder>,
    documents: HashMap<Uuid, Document>,
    tags: HashMap<Uuid, Tag>,
    audit: Vec<AuditLogEntry>,
    next_seq: i64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Current time truncated to the microsecond precision Postgres stores.
fn now() -> DateTime<Utc> {
    let t = Utc::now();
    DateTime::from_timestamp_micros(t.timestamp_micros()).unwrap_or(t)
}

/// A timestamp strictly after `prev`, and no earlier than the clock.
fn strictly_after(prev: DateTime<Utc>) -> DateTime<Utc> {
    now().max(prev + Duration::microseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_after_future_previous() {
        let future = now() + Duration::seconds(60);
        let next = strictly_after(future);
        assert!(next > future);
        assert_eq!(next - future, Duration::microseconds(1));
    }

    #[test]
    fn test_now_has_microsecond_precision() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000, 0);
    }
}

//! All open connections.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::handle::{ConnectionHandle, ConnectionId};

/// Open connections by ID.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a connection.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.connections.insert(handle.id, handle);
    }

    /// Stop tracking a connection.
    pub fn remove(&self, id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.remove(id).map(|(_, handle)| handle)
    }

    /// Look up a live connection.
    pub fn get(&self, id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .filter(|handle| handle.is_alive())
    }

    /// Live connections opened by `user_id`.
    pub fn for_user(&self, user_id: Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .filter(|entry| entry.value().user_id() == user_id && entry.value().is_alive())
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Number of tracked connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connection is tracked.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

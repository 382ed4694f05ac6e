//! Query → subscriber index.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::ConnectionId;
use crate::query::LiveQuery;

/// Which connections watch which queries, indexed both ways.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    /// Query → subscribed connections.
    queries: DashMap<LiveQuery, HashSet<ConnectionId>>,
    /// Connection → its queries.
    connections: DashMap<ConnectionId, HashSet<LiveQuery>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscription. Returns `false` if it already existed.
    pub fn subscribe(&self, query: LiveQuery, conn_id: ConnectionId) -> bool {
        let added = self.connections.entry(conn_id).or_default().insert(query);
        if added {
            self.queries.entry(query).or_default().insert(conn_id);
        }
        added
    }

    /// Removes a subscription. Returns `false` if it did not exist.
    pub fn unsubscribe(&self, query: &LiveQuery, conn_id: ConnectionId) -> bool {
        let removed = self
            .connections
            .get_mut(&conn_id)
            .map(|mut set| set.remove(query))
            .unwrap_or(false);
        self.connections.remove_if(&conn_id, |_, set| set.is_empty());
        self.detach(query, conn_id);
        removed
    }

    /// Removes every subscription of a connection.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) -> usize {
        let Some((_, queries)) = self.connections.remove(&conn_id) else {
            return 0;
        };
        for query in &queries {
            self.detach(query, conn_id);
        }
        queries.len()
    }

    /// Connections watching `query`.
    pub fn subscribers(&self, query: &LiveQuery) -> Vec<ConnectionId> {
        self.queries
            .get(query)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every query with at least one subscriber.
    pub fn active_queries(&self) -> Vec<LiveQuery> {
        self.queries.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of subscriptions held by a connection.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.connections
            .get(&conn_id)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Whether `conn_id` watches `query`.
    pub fn is_subscribed(&self, query: &LiveQuery, conn_id: ConnectionId) -> bool {
        self.connections
            .get(&conn_id)
            .is_some_and(|set| set.contains(query))
    }

    fn detach(&self, query: &LiveQuery, conn_id: ConnectionId) {
        if let Some(mut set) = self.queries.get_mut(query) {
            set.remove(&conn_id);
        }
        self.queries.remove_if(query, |_, set| set.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_subscribe_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let conn = Uuid::new_v4();
        assert!(registry.subscribe(LiveQuery::Tags, conn));
        assert!(!registry.subscribe(LiveQuery::Tags, conn));
        assert_eq!(registry.subscription_count(conn), 1);
        assert_eq!(registry.subscribers(&LiveQuery::Tags), vec![conn]);
    }

    #[test]
    fn test_unsubscribe_all_drops_empty_queries() {
        let registry = SubscriptionRegistry::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let folder = LiveQuery::FolderDocuments(Uuid::new_v4());

        registry.subscribe(LiveQuery::Categories, a);
        registry.subscribe(folder, a);
        registry.subscribe(LiveQuery::Categories, b);

        assert_eq!(registry.unsubscribe_all(a), 2);
        assert_eq!(registry.subscription_count(a), 0);
        assert_eq!(registry.active_queries(), vec![LiveQuery::Categories]);
        assert_eq!(registry.subscribers(&LiveQuery::Categories), vec![b]);
    }

    #[test]
    fn test_unsubscribe_single() {
        let registry = SubscriptionRegistry::new();
        let conn = Uuid::new_v4();
        registry.subscribe(LiveQuery::Tags, conn);
        assert!(registry.unsubscribe(&LiveQuery::Tags, conn));
        assert!(!registry.unsubscribe(&LiveQuery::Tags, conn));
        assert!(!registry.is_subscribed(&LiveQuery::Tags, conn));
        assert!(registry.active_queries().is_empty());
    }
}

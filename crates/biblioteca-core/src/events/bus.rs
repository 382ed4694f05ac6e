//! In-process broadcast bus for domain events.

use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

use super::{DomainEvent, EventPayload};

/// Fan-out bus connecting services (publishers) with the live-query
/// engine and any other listeners.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus that retains up to `buffer_size` undelivered events per
    /// subscriber.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size.max(1));
        Self { sender }
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, actor_id: Option<Uuid>, payload: EventPayload) {
        let event = DomainEvent::new(actor_id, payload);
        match self.sender.send(event) {
            Ok(receivers) => trace!(receivers, "Domain event published"),
            Err(_) => trace!("Domain event dropped, no subscribers"),
        }
    }

    /// Subscribe to all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CatalogEvent;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let id = Uuid::new_v4();
        bus.publish(None, EventPayload::Catalog(CatalogEvent::CategoryChanged { category_id: id }));

        let event = rx.recv().await.unwrap();
        match event.payload {
            EventPayload::Catalog(CatalogEvent::CategoryChanged { category_id }) => {
                assert_eq!(category_id, id)
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(8);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(None, EventPayload::Catalog(CatalogEvent::TagsChanged));
    }
}

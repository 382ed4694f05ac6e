//! Live-query engine: subscriptions in, snapshots out.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use biblioteca_core::config::realtime::RealtimeConfig;
use biblioteca_core::error::{AppError, ErrorKind};
use biblioteca_core::events::{DomainEvent, EventBus, EventPayload, UploadEvent, UserEvent};
use biblioteca_service::SessionContext;

use crate::connection::{ConnectionHandle, ConnectionId, ConnectionPool};
use crate::message::types::percent;
use crate::message::{InboundMessage, OutboundMessage};
use crate::query::LiveQuery;
use crate::registry::SubscriptionRegistry;
use crate::snapshot::SnapshotSource;

/// Central live-query engine shared by every WebSocket task.
#[derive(Clone)]
pub struct LiveQueryEngine {
    connections: Arc<ConnectionPool>,
    registry: Arc<SubscriptionRegistry>,
    snapshots: Arc<dyn SnapshotSource>,
    config: RealtimeConfig,
    version: Arc<AtomicU64>,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for LiveQueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQueryEngine")
            .field("connections", &self.connections.len())
            .finish()
    }
}

impl LiveQueryEngine {
    /// Creates an engine that loads snapshots from `snapshots`.
    pub fn new(config: RealtimeConfig, snapshots: Arc<dyn SnapshotSource>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        info!("Live-query engine initialized");
        Self {
            connections: Arc::new(ConnectionPool::new()),
            registry: Arc::new(SubscriptionRegistry::new()),
            snapshots,
            config,
            version: Arc::new(AtomicU64::new(1)),
            shutdown_tx,
        }
    }

    /// Consume domain events from `bus` until [`shutdown`](Self::shutdown).
    pub fn start(&self, bus: &EventBus) -> JoinHandle<()> {
        let mut events = bus.subscribe();
        let mut shutdown = self.shutdown_tx.subscribe();
        let engine = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = events.recv() => match received {
                        Ok(event) => engine.handle_event(&event).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Live-query engine lagged, resending every snapshot");
                            engine.resync_all().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = shutdown.recv() => break,
                }
            }
            info!("Live-query engine stopped");
        })
    }

    /// Stop the event loop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Interval at which socket tasks should ping clients.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.config.ping_interval_seconds.max(1))
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Track a new authenticated socket. The receiver yields the frames to
    /// write to it.
    pub fn register(
        &self,
        session: SessionContext,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(session, tx));
        self.connections.add(Arc::clone(&handle));
        info!(
            connection_id = %handle.id,
            user_id = %handle.user_id(),
            "Live-query connection opened"
        );
        (handle, rx)
    }

    /// Forget a socket and all of its subscriptions.
    pub fn unregister(&self, conn_id: ConnectionId) {
        if let Some(handle) = self.connections.remove(&conn_id) {
            handle.mark_dead();
        }
        let dropped = self.registry.unsubscribe_all(conn_id);
        info!(connection_id = %conn_id, dropped, "Live-query connection closed");
    }

    /// Handle one text frame from a client.
    pub async fn handle_inbound(&self, conn_id: ConnectionId, raw: &str) {
        let Some(handle) = self.connections.get(&conn_id) else {
            return;
        };

        let message: InboundMessage = match serde_json::from_str(raw) {
            Ok(message) => message,
            Err(e) => {
                debug!(connection_id = %conn_id, error = %e, "Unparseable frame");
                handle.send(OutboundMessage::error(
                    "INVALID_MESSAGE",
                    "Frame is not a valid message",
                    None,
                ));
                return;
            }
        };

        match message {
            InboundMessage::Subscribe { query } => self.subscribe(&handle, &query).await,
            InboundMessage::Unsubscribe { query } => self.unsubscribe(&handle, &query),
            InboundMessage::Pong { timestamp } => {
                debug!(connection_id = %conn_id, timestamp, "Pong");
            }
        }
    }

    async fn subscribe(&self, handle: &ConnectionHandle, name: &str) {
        let Some(query) = LiveQuery::parse(name) else {
            handle.send(OutboundMessage::error(
                "INVALID_QUERY",
                format!("Unknown live query: {name}"),
                Some(name.to_string()),
            ));
            return;
        };

        let already = self.registry.is_subscribed(&query, handle.id);
        if !already
            && self.registry.subscription_count(handle.id)
                >= self.config.max_subscriptions_per_connection
        {
            handle.send(OutboundMessage::error(
                "MAX_SUBSCRIPTIONS",
                format!(
                    "Maximum subscriptions ({}) reached",
                    self.config.max_subscriptions_per_connection
                ),
                Some(query.to_string()),
            ));
            return;
        }

        if let Err(e) = query.authorize(handle.session.role) {
            self.permission_denied(handle, &query, &e);
            return;
        }

        // Register before loading so no event between load and register is lost.
        self.registry.subscribe(query, handle.id);
        handle.send(OutboundMessage::Subscribed {
            query: query.to_string(),
        });
        debug!(connection_id = %handle.id, query = %query, "Subscribed to live query");

        if query.has_snapshot() {
            self.push_snapshot(handle, &query).await;
        }
    }

    fn unsubscribe(&self, handle: &ConnectionHandle, name: &str) {
        let Some(query) = LiveQuery::parse(name) else {
            handle.send(OutboundMessage::error(
                "INVALID_QUERY",
                format!("Unknown live query: {name}"),
                Some(name.to_string()),
            ));
            return;
        };
        self.registry.unsubscribe(&query, handle.id);
        handle.send(OutboundMessage::Unsubscribed {
            query: query.to_string(),
        });
    }

    /// React to one domain event.
    pub async fn handle_event(&self, event: &DomainEvent) {
        if let EventPayload::Upload(upload) = &event.payload {
            self.route_upload(upload);
            return;
        }
        if let EventPayload::User(UserEvent::RoleChanged { user_id, .. }) = &event.payload {
            self.expire_sessions(*user_id);
        }

        for query in self.registry.active_queries() {
            if !query.has_snapshot() {
                continue;
            }
            for conn_id in self.registry.subscribers(&query) {
                let Some(handle) = self.connections.get(&conn_id) else {
                    continue;
                };
                if query.affected_by(event, handle.user_id()) {
                    self.push_snapshot(&handle, &query).await;
                }
            }
        }
    }

    /// Close every socket of `user_id`. Their sessions carry the old role,
    /// so the client must reconnect with a refreshed token.
    fn expire_sessions(&self, user_id: Uuid) {
        for handle in self.connections.for_user(user_id) {
            handle.send(OutboundMessage::session_expired(
                "Your role changed; reconnect with a refreshed token",
            ));
            self.unregister(handle.id);
            info!(
                connection_id = %handle.id,
                user_id = %user_id,
                "Live-query session expired after role change"
            );
        }
    }

    async fn resync_all(&self) {
        for query in self.registry.active_queries() {
            if !query.has_snapshot() {
                continue;
            }
            for conn_id in self.registry.subscribers(&query) {
                if let Some(handle) = self.connections.get(&conn_id) {
                    self.push_snapshot(&handle, &query).await;
                }
            }
        }
    }

    /// Load and send the current snapshot. Subscriptions whose target is
    /// gone or no longer visible are dropped.
    async fn push_snapshot(&self, handle: &ConnectionHandle, query: &LiveQuery) {
        // Versions are taken before loading so a slower, older load is
        // always numbered below a newer one.
        let version = self.version.fetch_add(1, Ordering::Relaxed);

        match self.snapshots.load(&handle.session, query).await {
            Ok(data) => {
                handle.send(OutboundMessage::Snapshot {
                    query: query.to_string(),
                    version,
                    data,
                    timestamp: Utc::now(),
                });
            }
            Err(e) if e.kind == ErrorKind::Authorization => {
                self.registry.unsubscribe(query, handle.id);
                self.permission_denied(handle, query, &e);
            }
            Err(e) if e.kind == ErrorKind::NotFound => {
                self.registry.unsubscribe(query, handle.id);
                handle.send(OutboundMessage::error(
                    "NOT_FOUND",
                    e.message,
                    Some(query.to_string()),
                ));
            }
            Err(e) => {
                error!(
                    connection_id = %handle.id,
                    query = %query,
                    error = %e,
                    "Failed to load live-query snapshot"
                );
                handle.send(OutboundMessage::error(
                    "SNAPSHOT_FAILED",
                    "Failed to load query results",
                    Some(query.to_string()),
                ));
            }
        }
    }

    fn permission_denied(&self, handle: &ConnectionHandle, query: &LiveQuery, reason: &AppError) {
        warn!(
            target: "subscription.permission_denied",
            connection_id = %handle.id,
            user_id = %handle.user_id(),
            role = %handle.session.role,
            query = %query,
            reason = %reason.message,
            "Live-query subscription denied"
        );
        handle.send(OutboundMessage::error(
            "FORBIDDEN",
            reason.message.clone(),
            Some(query.to_string()),
        ));
    }

    /// Upload frames go only to the uploader's own subscriptions.
    fn route_upload(&self, event: &UploadEvent) {
        let (upload_id, owner_id, terminal, frame) = match event {
            UploadEvent::Progress {
                upload_id,
                owner_id,
                bytes_written,
                total_bytes,
            } => (
                *upload_id,
                *owner_id,
                false,
                OutboundMessage::UploadProgress {
                    upload_id: *upload_id,
                    bytes_written: *bytes_written,
                    total_bytes: *total_bytes,
                    percent: percent(*bytes_written, *total_bytes),
                },
            ),
            UploadEvent::Completed {
                upload_id,
                owner_id,
                url,
            } => (
                *upload_id,
                *owner_id,
                true,
                OutboundMessage::UploadCompleted {
                    upload_id: *upload_id,
                    url: url.clone(),
                },
            ),
            UploadEvent::Failed {
                upload_id,
                owner_id,
                message,
            } => (
                *upload_id,
                *owner_id,
                true,
                OutboundMessage::UploadFailed {
                    upload_id: *upload_id,
                    message: message.clone(),
                },
            ),
        };

        let query = LiveQuery::Upload(upload_id);
        for conn_id in self.registry.subscribers(&query) {
            let Some(handle) = self.connections.get(&conn_id) else {
                continue;
            };
            if handle.user_id() != owner_id {
                continue;
            }
            handle.send(frame.clone());
            if terminal {
                self.registry.unsubscribe(&query, conn_id);
            }
        }
    }
}

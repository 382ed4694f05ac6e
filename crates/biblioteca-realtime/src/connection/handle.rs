//! A single WebSocket connection.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use biblioteca_service::SessionContext;

use crate::message::OutboundMessage;

/// Unique connection identifier.
pub type ConnectionId = Uuid;

/// Sender side of a connection plus the session it was opened with.
///
/// Snapshots are loaded with `session`, so a subscriber only ever sees
/// what its own role permits.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Connection ID.
    pub id: ConnectionId,
    /// Session resolved when the socket was opened.
    pub session: SessionContext,
    /// Outbound frame queue, drained by the socket writer task.
    sender: mpsc::Sender<OutboundMessage>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Wrap a sender for `session`.
    pub fn new(session: SessionContext, sender: mpsc::Sender<OutboundMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            session,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Subscriber's user ID.
    pub fn user_id(&self) -> Uuid {
        self.session.user_id
    }

    /// Queue a frame without waiting. A full queue drops the frame; a closed
    /// one marks the connection dead.
    pub fn send(&self, message: OutboundMessage) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(connection_id = %self.id, "Outbound queue full, frame dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Whether the socket is still open.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Mark the socket as closed.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }
}

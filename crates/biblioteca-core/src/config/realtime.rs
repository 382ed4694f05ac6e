//! Live-query WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Live-query (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffer size of the domain event bus.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
    /// Outbound message buffer per connection.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Maximum live-query subscriptions per connection.
    #[serde(default = "default_max_subscriptions")]
    pub max_subscriptions_per_connection: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: default_event_buffer(),
            outbound_buffer_size: default_outbound_buffer(),
            ping_interval_seconds: default_ping_interval(),
            max_subscriptions_per_connection: default_max_subscriptions(),
        }
    }
}

fn default_event_buffer() -> usize {
    1024
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_max_subscriptions() -> usize {
    50
}

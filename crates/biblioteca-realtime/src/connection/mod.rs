//! WebSocket connection tracking.

pub mod handle;
pub mod pool;

pub use handle::{ConnectionHandle, ConnectionId};
pub use pool::ConnectionPool;

//! # biblioteca-realtime
//!
//! Live queries for Biblioteca. A client subscribes to a named query over
//! WebSocket and receives the full result immediately, then again after
//! every domain event that could change it. Updates are whole-snapshot
//! replacements, never deltas.
//!
//! - `query`: the named live queries and their invalidation rules
//! - `message`: the JSON frames exchanged with clients
//! - `connection`: per-socket handles and the connection pool
//! - `registry`: query → subscriber index
//! - `snapshot`: loading a query's current result
//! - `engine`: ties the above to the event bus

pub mod connection;
pub mod engine;
pub mod message;
pub mod query;
pub mod registry;
pub mod snapshot;

pub use engine::LiveQueryEngine;
pub use query::LiveQuery;
pub use snapshot::{ServiceSnapshots, SnapshotSource};

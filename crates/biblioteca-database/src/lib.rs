//! # biblioteca-database
//!
//! Persistence for every Biblioteca entity. Services depend on the store
//! traits in [`store`]; two backends implement them:
//!
//! * [`repositories`]: PostgreSQL via sqlx,
//! * [`memory`]: a process-local store for development and tests.
//!
//! [`DataStore`] selects the backend from configuration.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use provider::DataStore;

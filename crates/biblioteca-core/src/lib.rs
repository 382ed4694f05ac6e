//! # biblioteca-core
//!
//! Core crate for Biblioteca. Contains configuration schemas, domain
//! events and the in-process event bus, pagination types, the storage
//! provider trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Biblioteca crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

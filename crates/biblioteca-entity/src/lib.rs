//! # biblioteca-entity
//!
//! Domain entity models for Biblioteca. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow` so the Postgres repositories can map
//! rows directly.

pub mod audit;
pub mod category;
pub mod document;
pub mod folder;
pub mod identity;
pub mod tag;
pub mod user;

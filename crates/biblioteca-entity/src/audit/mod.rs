//! Audit log entities.

pub mod action;
pub mod model;

pub use action::{AuditAction, AuditEntityType};
pub use model::{AuditLogEntry, CreateAuditLogEntry};

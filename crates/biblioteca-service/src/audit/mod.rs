//! Audit recording and querying.

pub mod recorder;

pub use recorder::AuditRecorder;

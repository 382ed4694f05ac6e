//! Request and response DTOs specific to the HTTP layer.
//!
//! Service request types (`CreateFolderRequest`, `SetRoleRequest`, …) are
//! deserialized directly; only transport-only shapes live here.

pub mod request;
pub mod response;

//! # biblioteca-service
//!
//! Business logic service layer for Biblioteca. Each service orchestrates
//! the stores, object storage, and auth primitives to implement one area
//! of the library.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time. Every operation receives the caller's
//! [`SessionContext`] explicitly; there is no ambient "current user".

pub mod audit;
pub mod catalog;
pub mod context;
pub mod identity;
pub mod upload;
pub mod user;

pub use audit::AuditRecorder;
pub use catalog::{CategoryService, DocumentService, FolderService, TagService};
pub use context::SessionContext;
pub use identity::{AuthService, IdentityResolver, ResolvedIdentity};
pub use upload::UploadService;
pub use user::{AdminUserService, UserService};

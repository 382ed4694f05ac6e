//! Profile self-service and admin user management.

pub mod admin;
pub mod service;

pub use admin::{AdminUserService, PrincipalRecord, SetRoleRequest, SetRoleResponse};
pub use service::UserService;

//! Identity resolution and token-based authentication.

pub mod auth;
pub mod resolver;

pub use auth::{AuthService, AuthSession, RegisterRequest};
pub use resolver::{IdentityResolver, ResolvedIdentity};

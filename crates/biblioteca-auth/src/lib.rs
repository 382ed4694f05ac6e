//! # biblioteca-auth
//!
//! Authentication and authorization primitives for Biblioteca.
//!
//! ## Modules
//!
//! - `jwt`: ID tokens carrying the `role` custom claim
//! - `password`: Argon2id hashing and password policy
//! - `rbac`: role to permission table and its enforcer
//! - `predicates`: the pure `can_*` decisions every service consults

pub mod jwt;
pub mod password;
pub mod predicates;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
pub use rbac::{RbacEnforcer, RbacPolicies, SystemPermission};

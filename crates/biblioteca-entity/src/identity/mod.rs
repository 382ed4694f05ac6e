//! Authentication principal entities.

pub mod model;

pub use model::{CreateIdentity, Identity, IdentityClaims, Principal};

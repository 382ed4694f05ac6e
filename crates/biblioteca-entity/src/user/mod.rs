//! User profile entities.

pub mod model;
pub mod role;

pub use model::{CreateProfile, UpdateProfile, User};
pub use role::UserRole;

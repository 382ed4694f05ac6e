//! User-related domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to user profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UserEvent {
    /// A profile was created on first sign-in.
    ProfileCreated {
        /// The user ID.
        user_id: Uuid,
    },
    /// A profile's display name or avatar changed.
    ProfileUpdated {
        /// The user ID.
        user_id: Uuid,
    },
    /// A user's role changed.
    RoleChanged {
        /// The user whose role changed.
        user_id: Uuid,
        /// Previous role name.
        old_role: String,
        /// New role name.
        new_role: String,
    },
}

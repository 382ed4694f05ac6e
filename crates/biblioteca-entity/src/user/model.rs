//! User profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A user profile record, created the first time the identity resolver
/// observes a principal. Profiles are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Same identifier as the authentication principal.
    pub id: Uuid,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Stored role; reconciled with the token claim on sign-in.
    pub role: UserRole,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Label shown in audit entries: display name, then email, then a
    /// fixed fallback.
    pub fn actor_label(&self) -> String {
        actor_label(self.display_name.as_deref(), self.email.as_deref())
    }
}

/// Resolve the audit actor label from optional display name and email.
pub fn actor_label(display_name: Option<&str>, email: Option<&str>) -> String {
    display_name
        .filter(|s| !s.trim().is_empty())
        .or(email.filter(|s| !s.trim().is_empty()))
        .unwrap_or("Unknown user")
        .to_string()
}

/// Data required to create a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    /// Principal identifier.
    pub id: Uuid,
    /// Display name copied from the principal.
    pub display_name: Option<String>,
    /// Email copied from the principal.
    pub email: Option<String>,
    /// Initial role.
    pub role: UserRole,
}

/// Self-service profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    /// New display name.
    pub display_name: Option<String>,
    /// New avatar URL.
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_label_fallback_chain() {
        assert_eq!(actor_label(Some("Ana"), Some("ana@x.org")), "Ana");
        assert_eq!(actor_label(None, Some("ana@x.org")), "ana@x.org");
        assert_eq!(actor_label(Some("  "), Some("ana@x.org")), "ana@x.org");
        assert_eq!(actor_label(None, None), "Unknown user");
    }
}

//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three roles of the library.
///
/// The role is the sole authorization attribute of a user. Parsing is exact:
/// only `Admin`, `Editor`, and `User` are accepted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    /// Manages users, roles, categories, and all content.
    Admin,
    /// Manages categories and all content.
    Editor,
    /// Manages content they created.
    #[default]
    User,
}

impl UserRole {
    /// All roles, most privileged first.
    pub const ALL: [UserRole; 3] = [Self::Admin, Self::Editor, Self::User];

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Check if this role may manage content it does not own.
    pub fn is_editor_or_above(&self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }

    /// Return the canonical role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::User => "User",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = biblioteca_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Editor" => Ok(Self::Editor),
            "User" => Ok(Self::User),
            _ => Err(biblioteca_core::AppError::validation(format!(
                "Invalid role '{s}'. Expected one of: Admin, Editor, User"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_exact() {
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("Editor".parse::<UserRole>().unwrap(), UserRole::Editor);
        assert_eq!("User".parse::<UserRole>().unwrap(), UserRole::User);
        assert!("admin".parse::<UserRole>().is_err());
        assert!("SuperAdmin".parse::<UserRole>().is_err());
        assert!("".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        assert_eq!(serde_json::to_string(&UserRole::Editor).unwrap(), "\"Editor\"");
        let role: UserRole = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_privilege_helpers() {
        assert!(UserRole::Admin.is_editor_or_above());
        assert!(UserRole::Editor.is_editor_or_above());
        assert!(!UserRole::User.is_editor_or_above());
        assert!(!UserRole::Editor.is_admin());
    }
}

//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use biblioteca_entity::user::UserRole;

/// A role-level permission. Ownership-based rights (managing content one
/// created) are not listed here; see [`crate::predicates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPermission {
    /// Browse categories, folders, documents, and tags.
    ContentView,
    /// Create folders, documents, and tags, and upload files.
    ContentCreate,
    /// Edit, move, and delete any folder or document.
    ContentManageAny,
    /// Create, edit, and delete categories.
    CategoryManage,
    /// Rename and delete tags.
    TagManage,
    /// List every user and principal.
    UserList,
    /// Assign roles.
    UserChangeRole,
    /// Read the global audit log and other users' logs.
    AuditViewAll,
}

/// The permission set granted to `role`.
pub fn role_permissions(role: UserRole) -> &'static [SystemPermission] {
    use SystemPermission::*;
    match role {
        UserRole::User => &[ContentView, ContentCreate],
        UserRole::Editor => &[
            ContentView,
            ContentCreate,
            ContentManageAny,
            CategoryManage,
            TagManage,
        ],
        UserRole::Admin => &[
            ContentView,
            ContentCreate,
            ContentManageAny,
            CategoryManage,
            TagManage,
            UserList,
            UserChangeRole,
            AuditViewAll,
        ],
    }
}

/// Defines the mapping from each role to its set of allowed permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    /// Role → set of permissions.
    policies: HashMap<UserRole, HashSet<SystemPermission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let policies = UserRole::ALL
            .iter()
            .map(|role| (*role, role_permissions(*role).iter().copied().collect()))
            .collect();
        Self { policies }
    }

    /// Returns the set of permissions for the given role.
    pub fn permissions_for_role(&self, role: &UserRole) -> HashSet<SystemPermission> {
        self.policies.get(role).cloned().unwrap_or_default()
    }

    /// Checks whether the given role has the specified permission.
    pub fn has_permission(&self, role: &UserRole, permission: &SystemPermission) -> bool {
        self.policies
            .get(role)
            .map(|perms| perms.contains(permission))
            .unwrap_or(false)
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}

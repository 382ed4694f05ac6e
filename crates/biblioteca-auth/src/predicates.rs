//! Authorization predicates.
//!
//! Pure decisions over `(role, is_owner)`. The role half of every decision
//! comes from the permission table in [`crate::rbac::policies`], so the
//! predicates and [`crate::RbacEnforcer`] cannot drift apart.

use biblioteca_entity::user::UserRole;

use crate::rbac::policies::{SystemPermission, role_permissions};

fn granted(role: UserRole, permission: SystemPermission) -> bool {
    role_permissions(role).contains(&permission)
}

/// Edit or move a document.
pub fn can_manage_document(role: UserRole, is_owner: bool) -> bool {
    is_owner || granted(role, SystemPermission::ContentManageAny)
}

/// Rename a folder.
pub fn can_manage_folder(role: UserRole, is_owner: bool) -> bool {
    is_owner || granted(role, SystemPermission::ContentManageAny)
}

/// Create, edit, or delete a category. Ownership is irrelevant.
pub fn can_manage_category(role: UserRole) -> bool {
    granted(role, SystemPermission::CategoryManage)
}

/// List every user and principal.
pub fn can_list_all_users(role: UserRole) -> bool {
    granted(role, SystemPermission::UserList)
}

/// Delete a document.
pub fn can_delete_document(role: UserRole, is_owner: bool) -> bool {
    can_manage_document(role, is_owner)
}

/// Delete a folder.
pub fn can_delete_folder(role: UserRole, is_owner: bool) -> bool {
    can_manage_folder(role, is_owner)
}

/// Read a document. Every authenticated principal may.
pub fn can_view_document(role: UserRole) -> bool {
    granted(role, SystemPermission::ContentView)
}

/// Rename or delete tags.
pub fn can_manage_tags(role: UserRole) -> bool {
    granted(role, SystemPermission::TagManage)
}

/// Read an actor's audit trail; `is_self` when the caller is that actor.
pub fn can_view_audit_log(role: UserRole, is_self: bool) -> bool {
    is_self || granted(role, SystemPermission::AuditViewAll)
}

/// Assign roles through the privileged callable.
pub fn can_change_roles(role: UserRole) -> bool {
    granted(role, SystemPermission::UserChangeRole)
}

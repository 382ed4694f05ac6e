//! RBAC enforcement: checks whether a role has a required permission.

use biblioteca_core::error::AppError;
use biblioteca_entity::user::UserRole;

use super::policies::{RbacPolicies, SystemPermission};

/// Enforces role-based access control for service operations.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    /// The policy configuration.
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the default policy set.
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    /// Checks whether the given role has the required permission.
    pub fn require_permission(
        &self,
        role: &UserRole,
        permission: &SystemPermission,
    ) -> Result<(), AppError> {
        if self.policies.has_permission(role, permission) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{role}' does not have permission '{permission:?}'"
            )))
        }
    }

    /// Checks whether the role has the required permission (returns bool).
    pub fn has_permission(&self, role: &UserRole, permission: &SystemPermission) -> bool {
        self.policies.has_permission(role, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblioteca_core::error::ErrorKind;

    #[test]
    fn test_denial_is_authorization_error() {
        let err = RbacEnforcer::new()
            .require_permission(&UserRole::User, &SystemPermission::CategoryManage)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}

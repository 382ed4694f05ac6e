//! Admin user management: the `setRole` callable and principal listing.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use biblioteca_auth::predicates::can_change_roles;
use biblioteca_auth::rbac::{RbacEnforcer, SystemPermission};
use biblioteca_core::error::AppError;
use biblioteca_core::events::{EventBus, EventPayload, UserEvent};
use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_database::store::{IdentityStore, ProfileStore};
use biblioteca_entity::audit::{AuditAction, AuditEntityType};
use biblioteca_entity::user::{CreateProfile, User, UserRole};

use crate::audit::AuditRecorder;
use crate::context::SessionContext;

/// Message returned to callers for any backend failure of `set_role`.
const SET_ROLE_FAILED: &str = "Failed to update user role";

/// Default and maximum page size for principal listing.
pub const MAX_PRINCIPALS_PAGE: u64 = 1000;

/// Input of the `setRole` callable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetRoleRequest {
    /// Target principal ID.
    #[serde(default)]
    pub uid: String,
    /// One of `Admin`, `Editor`, `User`.
    #[serde(default)]
    pub role: String,
}

/// Result of the `setRole` callable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRoleResponse {
    /// Always `"success"`; failures are errors.
    pub status: String,
    /// Human-readable confirmation.
    pub message: String,
}

/// A registered principal with its role claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalRecord {
    /// Principal ID.
    pub uid: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Role claim, `User` when none was assigned.
    pub role: UserRole,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Handles administrative user operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    identities: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    rbac: RbacEnforcer,
    audit: AuditRecorder,
    events: EventBus,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        profiles: Arc<dyn ProfileStore>,
        audit: AuditRecorder,
        events: EventBus,
    ) -> Self {
        Self {
            identities,
            profiles,
            rbac: RbacEnforcer::new(),
            audit,
            events,
        }
    }

    /// Assign `role` to the principal `uid`.
    ///
    /// Only callers whose current claim is `Admin` may call this. The new
    /// claim is set first and then mirrored into the profile record, which
    /// is created if the target never signed in.
    pub async fn set_role(
        &self,
        ctx: &SessionContext,
        uid: &str,
        role: &str,
    ) -> AppResult<SetRoleResponse> {
        if !ctx.claim_role.is_some_and(can_change_roles) {
            warn!(caller_id = %ctx.user_id, "Role change rejected: caller is not an admin");
            return Err(AppError::authorization(
                "Only administrators can change user roles",
            ));
        }

        let uid = uid.trim();
        if uid.is_empty() {
            return Err(AppError::validation("The user id is required"));
        }
        let new_role = UserRole::from_str(role)?;

        // Principal IDs are UUIDs; any other string names nobody.
        let not_found = || AppError::not_found("User not found");
        let target_id = Uuid::parse_str(uid).map_err(|_| not_found())?;
        let identity = self
            .identities
            .find_by_id(target_id)
            .await
            .map_err(hide_backend_failure)?
            .ok_or_else(not_found)?;
        let old_role = identity.claim_role.unwrap_or_default();

        let updated = self
            .identities
            .set_claim_role(target_id, new_role)
            .await
            .map_err(hide_backend_failure)?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let profile = self
            .profiles
            .upsert_role(&CreateProfile {
                id: updated.id,
                display_name: updated.display_name.clone(),
                email: Some(updated.email.clone()),
                role: new_role,
            })
            .await
            .map_err(hide_backend_failure)?;

        info!(
            admin_id = %ctx.user_id,
            target_id = %target_id,
            old_role = %old_role,
            new_role = %new_role,
            "User role changed"
        );

        self.audit
            .record(
                ctx,
                AuditAction::RoleChange,
                AuditEntityType::User,
                target_id,
                &profile.actor_label(),
                format!("Changed role from {old_role} to {new_role}"),
            )
            .await;
        self.events.publish(
            Some(ctx.user_id),
            EventPayload::User(UserEvent::RoleChanged {
                user_id: target_id,
                old_role: old_role.to_string(),
                new_role: new_role.to_string(),
            }),
        );

        Ok(SetRoleResponse {
            status: "success".to_string(),
            message: format!("Role {new_role} assigned to user {target_id}"),
        })
    }

    /// Every registered principal with its role, fetched `limit` at a time.
    pub async fn list_principals(
        &self,
        ctx: &SessionContext,
        limit: Option<u64>,
    ) -> AppResult<Vec<PrincipalRecord>> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::UserList)?;

        let batch = limit
            .unwrap_or(MAX_PRINCIPALS_PAGE)
            .clamp(1, MAX_PRINCIPALS_PAGE);
        let mut principals = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.identities.list(offset, batch).await?;
            let fetched = page.len() as u64;
            principals.extend(page.into_iter().map(|identity| PrincipalRecord {
                uid: identity.id,
                email: identity.email,
                display_name: identity.display_name,
                role: identity.claim_role.unwrap_or_default(),
                created_at: identity.created_at,
            }));
            if fetched < batch {
                break;
            }
            offset += fetched;
        }
        Ok(principals)
    }

    /// Paginated profile records.
    pub async fn list_users(
        &self,
        ctx: &SessionContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::UserList)?;
        self.profiles.list(page).await
    }
}

fn hide_backend_failure(e: AppError) -> AppError {
    if e.kind.is_backend() {
        error!(error = %e, "Role change failed");
        AppError::internal(SET_ROLE_FAILED)
    } else {
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use biblioteca_core::error::ErrorKind;
    use biblioteca_database::DataStore;
    use biblioteca_entity::identity::{CreateIdentity, Identity};

    struct Fixture {
        store: DataStore,
        service: AdminUserService,
    }

    fn fixture() -> Fixture {
        let store = DataStore::memory();
        let bus = EventBus::default();
        let audit = AuditRecorder::new(store.audit.clone(), bus.clone());
        let service = AdminUserService::new(
            store.identities.clone(),
            store.profiles.clone(),
            audit,
            bus,
        );
        Fixture { store, service }
    }

    async fn identity(store: &DataStore, email: &str, role: Option<UserRole>) -> Identity {
        store
            .identities
            .create(&CreateIdentity {
                email: email.into(),
                password_hash: "x".into(),
                display_name: None,
                claim_role: role,
                bootstrap_role: None,
            })
            .await
            .unwrap()
    }

    fn ctx_for(identity: &Identity) -> SessionContext {
        SessionContext::new(
            identity.id,
            identity.claim_role.unwrap_or_default(),
            identity.claim_role,
            None,
            Some(identity.email.clone()),
        )
    }

    #[tokio::test]
    async fn test_admin_sets_role_and_mirrors_profile() {
        let f = fixture();
        let admin = identity(&f.store, "admin@uni.edu", Some(UserRole::Admin)).await;
        let target = identity(&f.store, "luis@uni.edu", None).await;

        let resp = f
            .service
            .set_role(&ctx_for(&admin), &target.id.to_string(), "Editor")
            .await
            .unwrap();
        assert_eq!(resp.status, "success");

        let claim = f.store.identities.find_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(claim.claim_role, Some(UserRole::Editor));
        let profile = f.store.profiles.find_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(profile.role, UserRole::Editor);

        let log = f.store.audit.list(&PageRequest::default()).await.unwrap();
        assert_eq!(log.items[0].action, AuditAction::RoleChange);
        assert_eq!(log.items[0].entity_id, target.id);
    }

    #[tokio::test]
    async fn test_non_admin_rejected_without_mutation() {
        let f = fixture();
        let editor = identity(&f.store, "ed@uni.edu", Some(UserRole::Editor)).await;
        let target = identity(&f.store, "luis@uni.edu", None).await;

        for caller in [ctx_for(&editor), ctx_for(&target)] {
            let err = f
                .service
                .set_role(&caller, &target.id.to_string(), "Admin")
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authorization);
        }

        let claim = f.store.identities.find_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(claim.claim_role, None);
        assert!(f.store.profiles.find_by_id(target.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stored_admin_role_without_admin_claim_is_rejected() {
        let f = fixture();
        let caller = identity(&f.store, "old@uni.edu", None).await;
        let mut ctx = ctx_for(&caller);
        ctx.role = UserRole::Admin;
        let err = f
            .service
            .set_role(&ctx, &caller.id.to_string(), "Admin")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_without_mutation() {
        let f = fixture();
        let admin = identity(&f.store, "admin@uni.edu", Some(UserRole::Admin)).await;
        let target = identity(&f.store, "luis@uni.edu", Some(UserRole::User)).await;
        let ctx = ctx_for(&admin);
        let uid = target.id.to_string();

        for (uid, role) in [
            (uid.as_str(), "Owner"),
            (uid.as_str(), "admin"),
            (uid.as_str(), ""),
            ("", "Editor"),
            ("   ", "Editor"),
            ("user123", "Owner"),
        ] {
            let err = f.service.set_role(&ctx, uid, role).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "uid={uid:?} role={role:?}");
        }

        let claim = f.store.identities.find_by_id(target.id).await.unwrap().unwrap();
        assert_eq!(claim.claim_role, Some(UserRole::User));
        assert_eq!(claim.claims_updated_at, target.claims_updated_at);
        assert_eq!(f.store.audit.list(&PageRequest::default()).await.unwrap().total_items, 0);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let f = fixture();
        let admin = identity(&f.store, "admin@uni.edu", Some(UserRole::Admin)).await;
        for uid in [Uuid::new_v4().to_string(), "user123".to_string()] {
            let err = f
                .service
                .set_role(&ctx_for(&admin), &uid, "User")
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::NotFound, "uid={uid:?}");
        }
        assert_eq!(f.store.audit.list(&PageRequest::default()).await.unwrap().total_items, 0);
    }

    /// An identity store whose writes always fail.
    #[derive(Debug)]
    struct BrokenClaims(Arc<dyn IdentityStore>);

    #[async_trait]
    impl IdentityStore for BrokenClaims {
        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
            self.0.find_by_id(id).await
        }
        async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
            self.0.find_by_email(email).await
        }
        async fn create(&self, data: &CreateIdentity) -> AppResult<Identity> {
            self.0.create(data).await
        }
        async fn set_claim_role(&self, _id: Uuid, _role: UserRole) -> AppResult<Option<Identity>> {
            Err(AppError::database("connection reset by peer at 10.0.0.3:5432"))
        }
        async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<Identity>> {
            self.0.list(offset, limit).await
        }
    }

    #[tokio::test]
    async fn test_backend_failure_is_generic() {
        let store = DataStore::memory();
        let bus = EventBus::default();
        let service = AdminUserService::new(
            Arc::new(BrokenClaims(store.identities.clone())),
            store.profiles.clone(),
            AuditRecorder::new(store.audit.clone(), bus.clone()),
            bus,
        );
        let admin = identity(&store, "admin@uni.edu", Some(UserRole::Admin)).await;
        let target = identity(&store, "luis@uni.edu", None).await;

        let err = service
            .set_role(&ctx_for(&admin), &target.id.to_string(), "Editor")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.message, "Failed to update user role");
    }

    #[tokio::test]
    async fn test_list_principals_pages_through_everything() {
        let f = fixture();
        let admin = identity(&f.store, "admin@uni.edu", Some(UserRole::Admin)).await;
        for i in 0..5 {
            identity(&f.store, &format!("u{i}@uni.edu"), None).await;
        }

        let all = f
            .service
            .list_principals(&ctx_for(&admin), Some(2))
            .await
            .unwrap();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0].role, UserRole::Admin);
        assert!(all[1..].iter().all(|p| p.role == UserRole::User));

        let user = identity(&f.store, "plain@uni.edu", None).await;
        let err = f
            .service
            .list_principals(&ctx_for(&user), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}

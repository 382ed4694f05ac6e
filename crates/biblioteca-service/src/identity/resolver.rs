//! Maps an authenticated principal and its claims to a role and profile.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use biblioteca_core::error::AppError;
use biblioteca_core::events::{EventBus, EventPayload, UserEvent};
use biblioteca_core::result::AppResult;
use biblioteca_database::store::ProfileStore;
use biblioteca_entity::identity::{IdentityClaims, Principal};
use biblioteca_entity::user::{CreateProfile, User, UserRole};

/// The outcome of resolving a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    /// Effective role: the claim when present, otherwise the stored role.
    pub role: UserRole,
    /// The profile record after reconciliation.
    pub profile: User,
}

/// Reconciles the role claim with the stored profile record.
///
/// Claims are authoritative: a differing stored role is overwritten. When
/// nothing differs no write is issued, so repeated resolution is free.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    profiles: Arc<dyn ProfileStore>,
    events: EventBus,
}

impl IdentityResolver {
    /// Creates a new resolver.
    pub fn new(profiles: Arc<dyn ProfileStore>, events: EventBus) -> Self {
        Self { profiles, events }
    }

    /// Resolve `principal` carrying `claims`.
    pub async fn resolve(
        &self,
        principal: &Principal,
        claims: &IdentityClaims,
    ) -> AppResult<ResolvedIdentity> {
        let profile = match self.profiles.find_by_id(principal.id).await? {
            Some(profile) => self.reconcile(profile, claims).await?,
            None => {
                let (profile, created) = self
                    .profiles
                    .insert_if_absent(&CreateProfile {
                        id: principal.id,
                        display_name: principal.display_name.clone(),
                        email: principal.email.clone(),
                        role: claims.role.unwrap_or_default(),
                    })
                    .await?;

                if created {
                    info!(user_id = %profile.id, role = %profile.role, "Profile created on first sign-in");
                    self.events.publish(
                        Some(profile.id),
                        EventPayload::User(UserEvent::ProfileCreated {
                            user_id: profile.id,
                        }),
                    );
                    profile
                } else {
                    // Lost a race with a concurrent first sign-in.
                    self.reconcile(profile, claims).await?
                }
            }
        };

        Ok(ResolvedIdentity {
            role: claims.role.unwrap_or(profile.role),
            profile,
        })
    }

    async fn reconcile(&self, profile: User, claims: &IdentityClaims) -> AppResult<User> {
        let Some(claim_role) = claims.role else {
            return Ok(profile);
        };
        if claim_role == profile.role {
            return Ok(profile);
        }

        let old_role = profile.role;
        let updated = self
            .profiles
            .set_role(profile.id, claim_role)
            .await?
            .ok_or_else(|| AppError::not_found("User profile disappeared during sign-in"))?;

        info!(
            user_id = %updated.id,
            old_role = %old_role,
            new_role = %claim_role,
            "Stored role reconciled with claim"
        );
        self.events.publish(
            Some(updated.id),
            EventPayload::User(UserEvent::RoleChanged {
                user_id: updated.id,
                old_role: old_role.to_string(),
                new_role: claim_role.to_string(),
            }),
        );
        Ok(updated)
    }
}

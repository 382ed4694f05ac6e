//! User self-service: own profile read and update.

use std::sync::Arc;

use tracing::info;

use biblioteca_core::error::AppError;
use biblioteca_core::events::{EventBus, EventPayload, UserEvent};
use biblioteca_core::result::AppResult;
use biblioteca_database::store::ProfileStore;
use biblioteca_entity::audit::{AuditAction, AuditEntityType};
use biblioteca_entity::user::{UpdateProfile, User};

use crate::audit::AuditRecorder;
use crate::context::SessionContext;

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    profiles: Arc<dyn ProfileStore>,
    audit: AuditRecorder,
    events: EventBus,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(profiles: Arc<dyn ProfileStore>, audit: AuditRecorder, events: EventBus) -> Self {
        Self {
            profiles,
            audit,
            events,
        }
    }

    /// Gets the caller's own profile.
    pub async fn get_profile(&self, ctx: &SessionContext) -> AppResult<User> {
        self.profiles
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the caller's display name or avatar.
    pub async fn update_profile(
        &self,
        ctx: &SessionContext,
        mut req: UpdateProfile,
    ) -> AppResult<User> {
        if let Some(name) = req.display_name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() || name.chars().count() > 100 {
                return Err(AppError::validation(
                    "Display name must be between 1 and 100 characters",
                ));
            }
        }
        if let Some(avatar) = req.avatar_url.as_mut() {
            *avatar = avatar.trim().to_string();
            if avatar.is_empty() {
                return Err(AppError::validation("Avatar URL cannot be empty"));
            }
        }

        let user = self
            .profiles
            .update(ctx.user_id, &req)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        info!(user_id = %user.id, "Profile updated");

        self.audit
            .record(
                ctx,
                AuditAction::Update,
                AuditEntityType::User,
                user.id,
                &user.actor_label(),
                "Updated own profile",
            )
            .await;
        self.events.publish(
            Some(ctx.user_id),
            EventPayload::User(UserEvent::ProfileUpdated { user_id: user.id }),
        );

        Ok(user)
    }
}

//! Identity and profile stores.

use async_trait::async_trait;
use uuid::Uuid;

use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_entity::identity::{CreateIdentity, Identity};
use biblioteca_entity::user::{CreateProfile, UpdateProfile, User, UserRole};

use super::{MemoryStore, now, strictly_after};
use crate::store::{IdentityStore, ProfileStore};

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        Ok(self.state.read().await.identities.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state
            .identities
            .values()
            .find(|i| i.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, data: &CreateIdentity) -> AppResult<Identity> {
        let mut state = self.state.write().await;
        if state
            .identities
            .values()
            .any(|i| i.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                data.email
            )));
        }
        let claim_role = match data.bootstrap_role {
            Some(role) if state.identities.is_empty() => Some(role),
            _ => data.claim_role,
        };
        let ts = now();
        let identity = Identity {
            id: Uuid::now_v7(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            display_name: data.display_name.clone(),
            claim_role,
            claims_updated_at: ts,
            created_at: ts,
        };
        state.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn set_claim_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<Identity>> {
        let mut state = self.state.write().await;
        Ok(state.identities.get_mut(&id).map(|identity| {
            identity.claim_role = Some(role);
            identity.claims_updated_at = strictly_after(identity.claims_updated_at);
            identity.clone()
        }))
    }

    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<Identity>> {
        let state = self.state.read().await;
        let mut all: Vec<&Identity> = state.identities.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.profiles.get(&id).cloned())
    }

    async fn insert_if_absent(&self, data: &CreateProfile) -> AppResult<(User, bool)> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.profiles.get(&data.id) {
            return Ok((existing.clone(), false));
        }
        let ts = now();
        let user = User {
            id: data.id,
            display_name: data.display_name.clone(),
            email: data.email.clone(),
            role: data.role,
            avatar_url: None,
            created_at: ts,
            updated_at: ts,
        };
        state.profiles.insert(user.id, user.clone());
        Ok((user, true))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.profiles.get_mut(&id).map(|user| {
            user.role = role;
            user.updated_at = now();
            user.clone()
        }))
    }

    async fn upsert_role(&self, data: &CreateProfile) -> AppResult<User> {
        let mut state = self.state.write().await;
        let ts = now();
        let user = state.profiles.entry(data.id).or_insert_with(|| User {
            id: data.id,
            display_name: data.display_name.clone(),
            email: data.email.clone(),
            role: data.role,
            avatar_url: None,
            created_at: ts,
            updated_at: ts,
        });
        user.role = data.role;
        user.updated_at = ts;
        Ok(user.clone())
    }

    async fn update(&self, id: Uuid, data: &UpdateProfile) -> AppResult<Option<User>> {
        let mut state = self.state.write().await;
        Ok(state.profiles.get_mut(&id).map(|user| {
            if let Some(name) = &data.display_name {
                user.display_name = Some(name.clone());
            }
            if let Some(avatar) = &data.avatar_url {
                user.avatar_url = Some(avatar.clone());
            }
            user.updated_at = now();
            user.clone()
        }))
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let state = self.state.read().await;
        let mut all: Vec<User> = state.profiles.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(PageResponse::from_slice(all, page))
    }
}

//! User profile repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_entity::user::{CreateProfile, UpdateProfile, User, UserRole};

use super::db_error;
use crate::store::ProfileStore;

/// Repository for user profile records.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user"))
    }

    async fn insert_if_absent(&self, data: &CreateProfile) -> AppResult<(User, bool)> {
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, display_name, email, role) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO NOTHING RETURNING *",
        )
        .bind(data.id)
        .bind(&data.display_name)
        .bind(&data.email)
        .bind(data.role)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to create user profile"))?;

        if let Some(user) = inserted {
            return Ok((user, true));
        }

        let existing = self
            .find_by_id(data.id)
            .await?
            .ok_or_else(|| AppError::database("Profile vanished during insert"))?;
        Ok((existing, false))
    }

    async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user role"))
    }

    async fn upsert_role(&self, data: &CreateProfile) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, display_name, email, role) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET role = EXCLUDED.role, updated_at = NOW() \
             RETURNING *",
        )
        .bind(data.id)
        .bind(&data.display_name)
        .bind(&data.email)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to upsert user role"))
    }

    async fn update(&self, id: Uuid, data: &UpdateProfile) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET display_name = COALESCE($2, display_name), \
             avatar_url = COALESCE($3, avatar_url), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.display_name)
        .bind(&data.avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user profile"))
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users"))?;

        Ok(PageResponse::new(users, page.page, page.page_size, total as u64))
    }
}

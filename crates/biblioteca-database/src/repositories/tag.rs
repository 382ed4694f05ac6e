//! Tag repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_entity::tag::Tag;

use super::{db_error, is_unique_violation};
use crate::store::TagStore;

/// Repository for tags.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagStore for TagRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find tag"))
    }

    async fn list_all(&self) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT * FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list tags"))
    }

    async fn count_existing(&self, ids: &[Uuid]) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count tags"))?;
        Ok(count as u64)
    }

    async fn create(&self, name: &str, created_by: Uuid) -> AppResult<Tag> {
        sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (id, name, created_by) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "tags_name_key") {
                AppError::conflict(format!("Tag '{name}' already exists"))
            } else {
                db_error("Failed to create tag")(e)
            }
        })
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Tag>> {
        sqlx::query_as::<_, Tag>("UPDATE tags SET name = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "tags_name_key") {
                    AppError::conflict(format!("Tag '{name}' already exists"))
                } else {
                    db_error("Failed to rename tag")(e)
                }
            })
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete tag"))?;
        Ok(result.rows_affected() > 0)
    }
}

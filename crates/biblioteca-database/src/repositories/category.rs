//! Category repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use biblioteca_core::result::AppResult;
use biblioteca_entity::category::{Category, CreateCategory, UpdateCategory};

use super::db_error;
use crate::store::{CategoryDeletion, CategoryStore};

/// Repository for categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find category"))
    }

    async fn list_all(&self) -> AppResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list categories"))
    }

    async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description, created_by) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create category"))
    }

    async fn update(&self, id: Uuid, data: &UpdateCategory) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = COALESCE($2, name), \
             description = COALESCE($3, description), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update category"))
    }

    async fn delete_if_unused(&self, id: Uuid) -> AppResult<CategoryDeletion> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock category"))?;
        if exists.is_none() {
            return Ok(CategoryDeletion::NotFound);
        }

        let (folders, documents): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM folders WHERE category_id = $1), \
                    (SELECT COUNT(*) FROM documents WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count category contents"))?;

        if folders > 0 || documents > 0 {
            return Ok(CategoryDeletion::InUse {
                folders: folders as u64,
                documents: documents as u64,
            });
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete category"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit category delete"))?;

        Ok(CategoryDeletion::Deleted)
    }
}

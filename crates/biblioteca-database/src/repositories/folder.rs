//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use biblioteca_core::result::AppResult;
use biblioteca_entity::folder::{CreateFolder, Folder};

use super::{db_error, lock_location};
use crate::store::{FolderDeletion, FolderStore, Placement};

/// Repository for folder CRUD and tree queries.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FolderStore for FolderRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find folder"))
    }

    async fn list_roots(&self, category_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE category_id = $1 AND parent_id IS NULL ORDER BY name ASC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list root folders"))
    }

    async fn list_children(&self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE parent_id = $1 ORDER BY name ASC")
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list child folders"))
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "WITH RECURSIVE ancestors AS ( \
                SELECT f.*, 0 AS lvl FROM folders f WHERE f.id = $1 \
                UNION ALL \
                SELECT p.*, a.lvl + 1 FROM folders p INNER JOIN ancestors a ON p.id = a.parent_id \
                WHERE a.lvl < 256 \
             ) SELECT id, category_id, parent_id, name, created_by, created_at, updated_at \
               FROM ancestors ORDER BY lvl DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find ancestors"))
    }

    async fn create(&self, data: &CreateFolder) -> AppResult<Placement<Folder>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if let Some(reason) = lock_location(&mut tx, data.category_id, data.parent_id).await? {
            return Ok(Placement::Rejected(reason));
        }

        let folder = sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (id, category_id, parent_id, name, created_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.category_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create folder"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder create"))?;

        Ok(Placement::Placed(folder))
    }

    async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to rename folder"))
    }

    async fn delete_if_empty(&self, id: Uuid) -> AppResult<FolderDeletion> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM folders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock folder"))?;
        if exists.is_none() {
            return Ok(FolderDeletion::NotFound);
        }

        let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE folder_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count folder documents"))?;
        if documents > 0 {
            return Ok(FolderDeletion::HasDocuments(documents as u64));
        }

        sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete folder"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder delete"))?;

        Ok(FolderDeletion::Deleted)
    }
}

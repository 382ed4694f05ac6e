//! Document repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use biblioteca_core::result::AppResult;
use biblioteca_core::types::pagination::{PageRequest, PageResponse};
use biblioteca_entity::document::{CreateDocument, Document, DocumentSearch, UpdateDocument};

use super::{db_error, lock_location};
use crate::store::{DocumentStore, Placement};

/// `last_updated` expression guaranteeing a strictly increasing value even
/// when two writes land within the clock's resolution.
const NEXT_LAST_UPDATED: &str = "GREATEST(clock_timestamp(), last_updated + INTERVAL '1 microsecond')";

/// Repository for documents.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find document"))
    }

    async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<Document>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count documents"))?;

        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents ORDER BY last_updated DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list documents"))?;

        Ok(PageResponse::new(documents, page.page, page.page_size, total as u64))
    }

    async fn list_root(&self, category_id: Uuid) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE category_id = $1 AND folder_id IS NULL ORDER BY title ASC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list root documents"))
    }

    async fn list_in_folder(&self, folder_id: Uuid) -> AppResult<Vec<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE folder_id = $1 ORDER BY title ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list folder documents"))
    }

    async fn create(&self, data: &CreateDocument) -> AppResult<Placement<Document>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if let Some(reason) = lock_location(&mut tx, data.category_id, data.folder_id).await? {
            return Ok(Placement::Rejected(reason));
        }

        let document = sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, category_id, folder_id, title, author, year, description, \
             subject, version, file_url, thumbnail_url, tag_ids, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.category_id)
        .bind(data.folder_id)
        .bind(&data.title)
        .bind(&data.author)
        .bind(data.year)
        .bind(&data.description)
        .bind(&data.subject)
        .bind(&data.version)
        .bind(&data.file_url)
        .bind(&data.thumbnail_url)
        .bind(&data.tag_ids)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to create document"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit document create"))?;

        Ok(Placement::Placed(document))
    }

    async fn update(&self, id: Uuid, data: &UpdateDocument) -> AppResult<Option<Document>> {
        let sql = format!(
            "UPDATE documents SET \
             title = COALESCE($2, title), author = COALESCE($3, author), \
             year = COALESCE($4, year), description = COALESCE($5, description), \
             subject = COALESCE($6, subject), version = COALESCE($7, version), \
             file_url = COALESCE($8, file_url), thumbnail_url = COALESCE($9, thumbnail_url), \
             tag_ids = COALESCE($10, tag_ids), last_updated = {NEXT_LAST_UPDATED} \
             WHERE id = $1 RETURNING *"
        );
        sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(&data.title)
            .bind(&data.author)
            .bind(data.year)
            .bind(&data.description)
            .bind(&data.subject)
            .bind(&data.version)
            .bind(&data.file_url)
            .bind(&data.thumbnail_url)
            .bind(&data.tag_ids)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to update document"))
    }

    async fn move_to(
        &self,
        id: Uuid,
        category_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Placement<Document>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM documents WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock document"))?;
        if exists.is_none() {
            return Ok(Placement::Missing);
        }
        if let Some(reason) = lock_location(&mut tx, category_id, folder_id).await? {
            return Ok(Placement::Rejected(reason));
        }

        let sql = format!(
            "UPDATE documents SET category_id = $2, folder_id = $3, \
             last_updated = {NEXT_LAST_UPDATED} WHERE id = $1 RETURNING *"
        );
        let document = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(category_id)
            .bind(folder_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to move document"))?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit document move"))?;

        Ok(Placement::Placed(document))
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>("DELETE FROM documents WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to delete document"))
    }

    async fn search(&self, search: &DocumentSearch) -> AppResult<Vec<Document>> {
        let pattern = format!("%{}%", escape_like(search.query.trim()));
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents \
             WHERE (title ILIKE $1 OR author ILIKE $1 OR subject ILIKE $1 OR description ILIKE $1) \
             AND ($2::uuid IS NULL OR category_id = $2) \
             AND ($3::uuid IS NULL OR $3 = ANY(tag_ids)) \
             ORDER BY last_updated DESC LIMIT $4",
        )
        .bind(pattern)
        .bind(search.category_id)
        .bind(search.tag_id)
        .bind(search.limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to search documents"))
    }

    async fn remove_tag(&self, tag_id: Uuid) -> AppResult<Vec<Uuid>> {
        let sql = format!(
            "UPDATE documents SET tag_ids = array_remove(tag_ids, $1), \
             last_updated = {NEXT_LAST_UPDATED} WHERE $1 = ANY(tag_ids) RETURNING id"
        );
        sqlx::query_scalar::<_, Uuid>(&sql)
            .bind(tag_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to remove tag from documents"))
    }
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

//! Identity repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use biblioteca_core::error::AppError;
use biblioteca_core::result::AppResult;
use biblioteca_entity::identity::{CreateIdentity, Identity};
use biblioteca_entity::user::UserRole;

use super::{db_error, is_unique_violation};
use crate::store::IdentityStore;

/// Repository for authentication principals.
#[derive(Debug, Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    /// Create a new identity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find identity"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find identity by email"))
    }

    async fn create(&self, data: &CreateIdentity) -> AppResult<Identity> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        // Registrations serialize here so only one can see an empty table.
        if data.bootstrap_role.is_some() {
            sqlx::query("LOCK TABLE identities IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to lock identities"))?;
        }

        let identity = sqlx::query_as::<_, Identity>(
            "INSERT INTO identities (id, email, password_hash, display_name, claim_role) \
             VALUES ($1, $2, $3, $4, \
                     CASE WHEN $6::user_role IS NOT NULL AND NOT EXISTS (SELECT 1 FROM identities) \
                          THEN $6::user_role ELSE $5::user_role END) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.display_name)
        .bind(data.claim_role)
        .bind(data.bootstrap_role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "identities_email_key") {
                AppError::conflict(format!("Email '{}' is already registered", data.email))
            } else {
                db_error("Failed to create identity")(e)
            }
        })?;
        tx.commit()
            .await
            .map_err(db_error("Failed to commit identity create"))?;

        Ok(identity)
    }

    async fn set_claim_role(&self, id: Uuid, role: UserRole) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>(
            "UPDATE identities SET claim_role = $2, \
             claims_updated_at = GREATEST(clock_timestamp(), claims_updated_at + INTERVAL '1 microsecond') \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update role claim"))
    }

    async fn list(&self, offset: u64, limit: u64) -> AppResult<Vec<Identity>> {
        sqlx::query_as::<_, Identity>(
            "SELECT * FROM identities ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list identities"))
    }
}

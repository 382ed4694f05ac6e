//! Schema migrations embedded from the workspace `migrations/` directory.

use serde::Serialize;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use biblioteca_core::error::{AppError, ErrorKind};

/// Migrations compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Postgres SQLSTATE for a missing relation.
const UNDEFINED_TABLE: &str = "42P01";

/// One embedded migration and whether the database has applied it.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

/// Apply every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!(known = MIGRATOR.iter().count(), "Applying database migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Failed to run migrations: {e}"),
            e,
        )
    })?;

    info!("Database schema is up to date");
    Ok(())
}

/// Compare the embedded migrations with the ones the database recorded.
pub async fn migration_status(pool: &PgPool) -> Result<Vec<MigrationStatus>, AppError> {
    let applied = applied_versions(pool).await?;
    Ok(MIGRATOR
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}

/// Versions recorded as successfully applied. A database that never ran
/// migrations has none.
async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>, AppError> {
    let result = sqlx::query_scalar::<_, i64>(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version",
    )
    .fetch_all(pool)
    .await;

    match result {
        Ok(versions) => Ok(versions),
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNDEFINED_TABLE) => {
            Ok(Vec::new())
        }
        Err(e) => Err(AppError::with_source(
            ErrorKind::Database,
            "Failed to read migration history",
            e,
        )),
    }
}

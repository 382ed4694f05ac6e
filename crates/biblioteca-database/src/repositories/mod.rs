//! PostgreSQL store implementations.

pub mod audit;
pub mod category;
pub mod document;
pub mod folder;
pub mod identity;
pub mod tag;
pub mod user;

pub use audit::AuditLogRepository;
pub use category::CategoryRepository;
pub use document::DocumentRepository;
pub use folder::FolderRepository;
pub use identity::IdentityRepository;
pub use tag::TagRepository;
pub use user::UserRepository;

use sqlx::PgConnection;
use uuid::Uuid;

use biblioteca_core::error::{AppError, ErrorKind};
use biblioteca_core::result::AppResult;

use crate::store::LocationError;

/// Wrap a sqlx error as a database error with context. An exhausted or
/// closing pool is reported as unavailable rather than failed.
pub(crate) fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            AppError::service_unavailable("The database is busy; try again shortly")
        }
        e => AppError::with_source(ErrorKind::Database, message, e),
    }
}

/// Whether `e` is a unique violation on the named constraint or index.
pub(crate) fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.constraint() == Some(constraint))
}

/// Check a location and hold `FOR SHARE` locks on its category and folder
/// rows until the surrounding transaction ends. Conditional deletes take
/// `FOR UPDATE` on the same rows, so they wait for the placement to commit.
pub(crate) async fn lock_location(
    conn: &mut PgConnection,
    category_id: Uuid,
    folder_id: Option<Uuid>,
) -> AppResult<Option<LocationError>> {
    let category = sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE id = $1 FOR SHARE")
        .bind(category_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to lock category"))?;
    if category.is_none() {
        return Ok(Some(LocationError::CategoryNotFound));
    }

    let Some(folder_id) = folder_id else {
        return Ok(None);
    };
    let owner = sqlx::query_scalar::<_, Uuid>("SELECT category_id FROM folders WHERE id = $1 FOR SHARE")
        .bind(folder_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error("Failed to lock folder"))?;
    Ok(match owner {
        None => Some(LocationError::FolderNotFound),
        Some(owner) if owner != category_id => Some(LocationError::FolderOutsideCategory),
        Some(_) => None,
    })
}

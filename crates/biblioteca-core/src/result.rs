//! Convenience result type alias for Biblioteca.

use crate::error::AppError;

/// A specialized `Result` type for Biblioteca operations.
pub type AppResult<T> = Result<T, AppError>;

//! Common error types for LeadTrk

use thiserror::Error;

/// Common result type for LeadTrk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the core logic and the HTTP surface
///
/// Each variant maps to exactly one HTTP status code in the api crate:
/// Validation 400, Unauthorized 401, Forbidden 403, NotFound 404,
/// Conflict 409, everything else 500.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed required input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid credential
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but wrong role for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Target row absent or not visible to the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate-ownership violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error came from the unique-owner index tripping,
    /// i.e. a lost race that the caller may retry after re-reading.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
            }
            _ => false,
        }
    }
}

//! Repository Module
//!
//! CRUD operations over the SQLite tables. Repositories are free functions
//! taking a `&SqlitePool`, returning [`RepoResult`].

pub mod contact;
pub mod dispatch;
pub mod sequence;
pub mod user;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Bounded attempts for operations hitting transient SQLite contention
/// before surfacing [`RepoError::Contention`] to the caller.
pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation carrying a precise error code
    #[error("{1}")]
    Business(ErrorCode, String),

    /// Counter row missing or unreachable; nothing was applied
    #[error("Dispatch sequence row missing")]
    SequenceMissing,

    /// Transient write conflict that persisted past the bounded retries
    #[error("Dispatch sequence contention: {0}")]
    Contention(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// True for SQLITE_BUSY / SQLITE_LOCKED and their extended codes
fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some("5") | Some("6") | Some("261") | Some("517")
        ),
        _ => false,
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if is_transient(&err) {
            RepoError::Contention(err.to_string())
        } else {
            RepoError::Database(err.to_string())
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
            RepoError::SequenceMissing => AppError::new(ErrorCode::SequenceUnavailable),
            RepoError::Contention(msg) => {
                AppError::with_message(ErrorCode::SequenceContention, msg)
            }
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures.
///
/// All of these are deterministic validation failures returned synchronously
/// to the caller; none are retried.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Comment parent belongs to a different post")]
    InvalidParent,

    #[error("A post with this slug already exists for this publish date")]
    SlugConflict,

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Operation forbidden for this user")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
///
/// `InvalidParent` and `SlugConflict` are integrity rules the store enforces
/// at the storage boundary, not in the callers.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Comment parent belongs to a different post")]
    InvalidParent,

    #[error("Slug already used on this publish date")]
    SlugConflict,
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound("resource".to_string()),
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::InvalidParent => DomainError::InvalidParent,
            RepoError::SlugConflict => DomainError::SlugConflict,
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}

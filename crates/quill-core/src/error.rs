//! Domain-level error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: i32 },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Storage failure: {0}")]
    Storage(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn user_not_found(id: i32) -> Self {
        Self::NotFound {
            entity_type: "User",
            id,
        }
    }

    pub fn post_not_found(id: i32) -> Self {
        Self::NotFound {
            entity_type: "Post",
            id,
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Unique constraint violated: {0}")]
    Duplicate(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKey(String),
}

impl From<crate::ports::PasswordError> for DomainError {
    fn from(err: crate::ports::PasswordError) -> Self {
        DomainError::Internal(err.to_string())
    }
}

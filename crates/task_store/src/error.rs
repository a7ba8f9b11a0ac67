//! Task store error types.

use entities::ValidationErrors;
use thiserror::Error;

/// Errors that can occur during task store operations.
#[derive(Debug, Error)]
pub enum TaskStoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Duplicate entity.
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// A unique column already holds the value.
    #[error("{field} already taken: {value}")]
    UniqueViolation { field: &'static str, value: String },

    /// A referenced record does not exist.
    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    /// The record failed validation on write.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl TaskStoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a unique violation error.
    pub fn unique(field: &'static str, value: impl Into<String>) -> Self {
        Self::UniqueViolation {
            field,
            value: value.into(),
        }
    }
}

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

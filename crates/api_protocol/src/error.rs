//! API error bodies and codes.

use std::collections::BTreeMap;

use entities::ValidationErrors;
use serde::{Deserialize, Serialize};

/// Application error codes carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request body could not be read
    InvalidRequest,
    /// Internal server error
    InternalError,
    /// Authentication required or token rejected
    Unauthorized,
    /// Authenticated but not allowed to perform this action
    Forbidden,
    /// The requested resource was not found
    NotFound,
    /// One or more fields failed validation
    ValidationFailed,
    /// Username/password pair rejected
    InvalidCredentials,
    /// The task has no report yet
    TaskNotCompleted,
}

/// Error object inside an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
    /// Field name to messages, for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    /// Creates a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fields: None,
        }
    }

    /// Creates a validation error listing every failing field.
    pub fn validation(errors: &ValidationErrors) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: "Validation failed".to_string(),
            fields: Some(errors.fields().clone()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Top-level error response: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ApiError,
}

impl From<ApiError> for ErrorBody {
    fn from(error: ApiError) -> Self {
        Self { error }
    }
}

//! Server error types.

use api_protocol::{ApiError, ErrorBody, ErrorCode};
use auth::{AuthError, Denial};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use entities::{NON_FIELD_ERRORS, ValidationErrors};
use task_store::TaskStoreError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The request body could not be read.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// One or more fields failed validation.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Refused by the authorization engine.
    #[error("Permission denied: {0}")]
    Denied(#[from] Denial),

    /// Database error.
    #[error("Database error: {0}")]
    Database(TaskStoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// A single field error.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    /// A non-field validation error.
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::field(NON_FIELD_ERRORS, message)
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<TaskStoreError> for ServerError {
    fn from(error: TaskStoreError) -> Self {
        match error {
            TaskStoreError::Validation(errors) => Self::Validation(errors),
            TaskStoreError::UniqueViolation { field, .. } => {
                let message = match field {
                    "username" => "A user with that username already exists.",
                    "email" => "A user with that email already exists.",
                    _ => "This value is already taken.",
                };
                Self::field(field, message)
            }
            TaskStoreError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type} {id}"))
            }
            other => Self::Database(other),
        }
    }
}

impl ServerError {
    fn status_and_body(&self) -> (StatusCode, ApiError) {
        match self {
            ServerError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ApiError::new(ErrorCode::InvalidRequest, msg.clone()),
            ),
            ServerError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, ApiError::validation(errors))
            }
            ServerError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ApiError::new(ErrorCode::NotFound, format!("Not found: {msg}")),
            ),
            ServerError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                ApiError::new(ErrorCode::Unauthorized, "Authentication required"),
            ),
            ServerError::Denied(denial) if denial.is_forbidden() => (
                StatusCode::FORBIDDEN,
                ApiError::new(ErrorCode::Forbidden, denial.to_string()),
            ),
            ServerError::Denied(denial) => (
                StatusCode::BAD_REQUEST,
                ApiError::new(ErrorCode::TaskNotCompleted, denial.to_string()),
            ),
            ServerError::Auth(e) if e.is_credential_error() => (
                StatusCode::BAD_REQUEST,
                ApiError::new(ErrorCode::InvalidCredentials, e.to_string()),
            ),
            ServerError::Auth(
                AuthError::JwtEncoding(_)
                | AuthError::PasswordHashing(_)
                | AuthError::MalformedPasswordHash,
            ) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new(ErrorCode::InternalError, "Internal server error"),
            ),
            ServerError::Auth(e) => (
                StatusCode::UNAUTHORIZED,
                ApiError::new(ErrorCode::Unauthorized, e.to_string()),
            ),
            ServerError::Database(_) | ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new(ErrorCode::InternalError, "Internal server error"),
            ),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(ErrorBody::from(error))).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

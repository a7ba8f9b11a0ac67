//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// JWT validation failed.
    #[error("JWT validation failed: {0}")]
    JwtValidation(String),

    /// JWT encoding failed.
    #[error("JWT encoding failed: {0}")]
    JwtEncoding(String),

    /// Token expired.
    #[error("Token expired")]
    TokenExpired,

    /// Invalid token.
    #[error("Invalid token")]
    InvalidToken,

    /// Token was revoked by a logout.
    #[error("Token revoked")]
    TokenRevoked,

    /// Unknown username or wrong password. Deliberately does not say which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credentials are correct but the identity is inactive.
    #[error("User account is disabled")]
    AccountDisabled,

    /// Hashing a new password failed.
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    /// A stored password hash could not be parsed.
    #[error("Malformed password hash")]
    MalformedPasswordHash,
}

impl AuthError {
    /// Returns true for errors caused by the submitted username or password.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::AccountDisabled)
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidToken => AuthError::InvalidToken,
            _ => AuthError::JwtValidation(e.to_string()),
        }
    }
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

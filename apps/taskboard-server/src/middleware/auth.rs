//! Authentication middleware.

use std::sync::Arc;

use auth::Claims;
use axum::{
    extract::{Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
    },
    middleware::Next,
    response::Response,
};
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Cookie carrying the access token for panel clients.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated identity, stored in the request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Identity ID.
    pub id: Uuid,
    /// Username at token issue time.
    pub username: String,
    /// Claims of the presented token, kept for logout.
    pub claims: Claims,
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = auth::AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            id: claims.identity_id()?,
            username: claims.username.clone(),
            claims,
        })
    }
}

/// Extracts the access token from the Authorization header or, failing
/// that, from the panel cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|token| token.into_owned())
        .filter(|token| !token.is_empty())
}

/// Resolves the token to an active identity.
async fn authenticate<S: TaskStore>(
    state: &AppState<S>,
    headers: &HeaderMap,
) -> ServerResult<AuthenticatedUser> {
    let token = extract_token(headers).ok_or(ServerError::AuthenticationRequired)?;
    let claims = state.jwt_manager.validate_token(&token)?;

    if state.revoked_tokens.is_revoked(&claims.jti).await {
        return Err(auth::AuthError::TokenRevoked.into());
    }

    let user = AuthenticatedUser::try_from(claims)?;
    match state.store.get_identity(user.id).await? {
        Some(identity) if identity.is_active => Ok(user),
        _ => Err(ServerError::AuthenticationRequired),
    }
}

/// Authentication middleware.
///
/// Validates the access token, rejects revoked tokens and identities that
/// are gone or inactive, and stores the [`AuthenticatedUser`] in the request
/// extensions.
pub async fn auth_middleware<S: TaskStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> ServerResult<Response> {
    let user = authenticate(&state, request.headers()).await?;
    tracing::debug!(identity_id = %user.id, "Request authenticated");

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

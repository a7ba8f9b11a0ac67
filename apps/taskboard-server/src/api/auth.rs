//! Authentication API endpoints.

use std::sync::Arc;

use api_protocol::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use task_store::TaskStore;

use crate::error::ServerResult;
use crate::extract::ApiJson;
use crate::middleware::AuthenticatedUser;
use crate::services::{accounts, user_view};
use crate::state::AppState;

/// Registers a new identity.
pub async fn register<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ServerResult<(StatusCode, Json<RegisterResponse>)> {
    let account = accounts::register(&state, request).await?;
    let user = user_view(&state.store, &account).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// Exchanges credentials for an access token.
pub async fn login<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ServerResult<Json<LoginResponse>> {
    let (account, access_token) =
        accounts::login(&state, &request.username, &request.password).await?;
    let user = user_view(&state.store, &account).await?;

    Ok(Json(LoginResponse {
        user,
        access_token,
        expires_in: state.jwt_manager.expiration_seconds(),
    }))
}

/// Revokes the presented access token.
pub async fn logout<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> StatusCode {
    accounts::logout(&state, &user).await;
    StatusCode::RESET_CONTENT
}

/// Returns the authenticated identity.
pub async fn get_profile<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<UserView>> {
    let account = accounts::current_account(&state, user.id).await?;
    Ok(Json(user_view(&state.store, &account).await?))
}

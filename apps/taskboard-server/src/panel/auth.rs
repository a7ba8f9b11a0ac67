//! Panel login and logout.

use std::sync::Arc;

use api_protocol::{FlashQuery, LoginForm, PanelLoginView};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::IntoResponse,
};
use task_store::TaskStore;

use super::{DASHBOARD_PATH, LOGIN_PATH, PanelResult, redirect_with_flash};
use crate::extract::{ApiForm, ApiQuery};
use crate::middleware::{ACCESS_TOKEN_COOKIE, extract_token};
use crate::services::accounts;
use crate::state::AppState;

fn session_cookie(token: &str, max_age: u64) -> String {
    format!(
        "{ACCESS_TOKEN_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        urlencoding::encode(token)
    )
}

/// Login page view model.
pub async fn login_page(ApiQuery(query): ApiQuery<FlashQuery>) -> Json<PanelLoginView> {
    Json(PanelLoginView { flash: query.flash })
}

/// Verifies credentials and stores the access token in a cookie.
pub async fn login<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    ApiForm(form): ApiForm<LoginForm>,
) -> PanelResult<impl IntoResponse> {
    let (account, token) = accounts::login(&state, &form.username, &form.password).await?;
    let cookie = session_cookie(&token, state.jwt_manager.expiration_seconds());
    let flash = format!("Welcome back, {}!", account.identity.username);

    Ok(([(SET_COOKIE, cookie)], redirect_with_flash(DASHBOARD_PATH, &flash)))
}

/// Revokes the presented token, if still valid, and clears the cookie.
pub async fn logout<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let claims = extract_token(&headers).and_then(|token| state.jwt_manager.validate_token(&token).ok());
    if let Some(claims) = claims {
        state.revoked_tokens.revoke(&claims).await;
        tracing::info!(username = %claims.username, "Panel logout");
    }

    (
        [(SET_COOKIE, session_cookie("", 0))],
        redirect_with_flash(LOGIN_PATH, "You have been logged out successfully."),
    )
}

//! Panel dashboard.

use std::sync::Arc;

use api_protocol::{FlashQuery, PanelHomeView};
use axum::{Extension, Json, extract::State};
use task_store::TaskStore;

use super::PanelResult;
use crate::extract::ApiQuery;
use crate::middleware::AuthenticatedUser;
use crate::services::{accounts, dashboard, resolve_actor, user_view};
use crate::state::AppState;

/// Dashboard for the caller's role.
pub async fn home<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<FlashQuery>,
) -> PanelResult<Json<PanelHomeView>> {
    let actor = resolve_actor(&state, user.id).await?;
    let account = accounts::current_account(&state, user.id).await?;

    Ok(Json(PanelHomeView {
        user: user_view(&state.store, &account).await?,
        dashboard: dashboard::dashboard(&state, &actor).await?,
        flash: query.flash,
    }))
}

//! Dashboard endpoint.

use std::sync::Arc;

use api_protocol::DashboardView;
use axum::{Extension, Json, extract::State};
use task_store::TaskStore;

use crate::error::ServerResult;
use crate::middleware::AuthenticatedUser;
use crate::services::{dashboard, resolve_actor};
use crate::state::AppState;

/// Returns the dashboard for the caller's role.
pub async fn get_dashboard<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ServerResult<Json<DashboardView>> {
    let actor = resolve_actor(&state, user.id).await?;
    Ok(Json(dashboard::dashboard(&state, &actor).await?))
}

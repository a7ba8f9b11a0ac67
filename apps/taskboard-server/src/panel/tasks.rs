//! Panel task pages.

use std::sync::Arc;

use api_protocol::{FlashQuery, ListTasksQuery, PanelTasksView, TaskForm, TaskView};
use auth::policy;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Redirect,
};
use task_store::TaskStore;

use super::{PanelError, PanelResult, TASKS_PATH, redirect_with_flash};
use crate::extract::{ApiForm, ApiQuery};
use crate::middleware::AuthenticatedUser;
use crate::services::{Usernames, parse_id, resolve_actor, task_view, tasks};
use crate::state::AppState;

/// Tasks visible to the caller.
pub async fn list_tasks<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<FlashQuery>,
) -> PanelResult<Json<PanelTasksView>> {
    let actor = resolve_actor(&state, user.id).await?;
    let (tasks, _total) = tasks::list_tasks(&state, &actor, ListTasksQuery::default()).await?;

    Ok(Json(PanelTasksView {
        tasks: Usernames::new(&state.store).tasks(&tasks).await?,
        can_create: policy::authorize_task_create(&actor).is_allowed(),
        flash: query.flash,
    }))
}

pub async fn create_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiForm(form): ApiForm<TaskForm>,
) -> PanelResult<Redirect> {
    let actor = resolve_actor(&state, user.id).await?;
    let task = tasks::create_task(&state, &actor, form.into())
        .await
        .map_err(PanelError::denied_to(TASKS_PATH))?;

    let flash = format!("Task \"{}\" created successfully.", task.title);
    Ok(redirect_with_flash(TASKS_PATH, &flash))
}

pub async fn update_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiForm(form): ApiForm<TaskForm>,
) -> PanelResult<Redirect> {
    let id = parse_id("Task", &id)?;
    let actor = resolve_actor(&state, user.id).await?;
    let task = tasks::update_task(&state, &actor, id, form.into())
        .await
        .map_err(PanelError::denied_to(TASKS_PATH))?;

    let flash = format!("Task \"{}\" updated successfully.", task.title);
    Ok(redirect_with_flash(TASKS_PATH, &flash))
}

/// Report of a completed task.
pub async fn task_report<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> PanelResult<Json<TaskView>> {
    let id = parse_id("Task", &id)?;
    let actor = resolve_actor(&state, user.id).await?;
    let task = tasks::task_report(&state, &actor, id)
        .await
        .map_err(PanelError::denied_to(TASKS_PATH))?;

    Ok(Json(task_view(&state.store, &task).await?))
}

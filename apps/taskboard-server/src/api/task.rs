//! Task API endpoints.

use std::sync::Arc;

use api_protocol::{CreateTaskRequest, ListTasksQuery, TaskView, UpdateTaskRequest};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use task_store::TaskStore;

use crate::error::ServerResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::AuthenticatedUser;
use crate::services::{Usernames, parse_id, resolve_actor, task_view, tasks};
use crate::state::AppState;

/// Lists the tasks visible to the caller.
pub async fn list_tasks<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<ListTasksQuery>,
) -> ServerResult<Json<Vec<TaskView>>> {
    let actor = resolve_actor(&state, user.id).await?;
    let (tasks, _total) = tasks::list_tasks(&state, &actor, query).await?;

    Ok(Json(Usernames::new(&state.store).tasks(&tasks).await?))
}

/// Creates a task.
pub async fn create_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> ServerResult<(StatusCode, Json<TaskView>)> {
    let actor = resolve_actor(&state, user.id).await?;
    let task = tasks::create_task(&state, &actor, request).await?;

    Ok((StatusCode::CREATED, Json(task_view(&state.store, &task).await?)))
}

/// Partially updates a task.
pub async fn update_task<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> ServerResult<Json<TaskView>> {
    let id = parse_id("Task", &id)?;
    let actor = resolve_actor(&state, user.id).await?;
    let task = tasks::update_task(&state, &actor, id, request).await?;

    Ok(Json(task_view(&state.store, &task).await?))
}

/// Returns the report of a completed task.
pub async fn get_task_report<S: TaskStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ServerResult<Json<TaskView>> {
    let id = parse_id("Task", &id)?;
    let actor = resolve_actor(&state, user.id).await?;
    let task = tasks::task_report(&state, &actor, id).await?;

    Ok(Json(task_view(&state.store, &task).await?))
}

//! Task listing, creation, updates and reports.

use api_protocol::{IdentityRef, ListTasksQuery, TaskPayload, parse_due_date};
use auth::{Actor, policy};
use entities::{REQUIRED_MESSAGE, Task, TaskPatch, TaskStatus, ValidationErrors};
use task_store::{TaskFilter, TaskStore};
use uuid::Uuid;

use super::find_identity;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// A decoded task payload.
#[derive(Debug, Default)]
struct TaskChanges {
    patch: TaskPatch,
    /// Hours were sent blank and should be cleared.
    clear_hours: bool,
    /// Hours that failed to decode; only an error if the task ends up completed.
    hours_error: Option<String>,
}

impl TaskChanges {
    fn apply_to(self, task: &mut Task, errors: &mut ValidationErrors) {
        task.apply_patch(self.patch);
        if self.clear_hours {
            task.worked_hours = None;
        }
        if let Some(message) = self.hours_error.filter(|_| task.is_completed()) {
            errors.add("workedHours", message);
        }
    }
}

/// Decodes the payload field by field, collecting every field error.
async fn decode_payload<S: TaskStore>(
    store: &S,
    payload: TaskPayload,
) -> ServerResult<(TaskChanges, ValidationErrors)> {
    let mut errors = ValidationErrors::new();
    let mut changes = TaskChanges::default();
    let patch = &mut changes.patch;

    patch.title = payload.title.map(|title| title.trim().to_string());
    patch.description = payload.description;
    patch.completion_report = payload.completion_report;

    if let Some(raw) = payload.assigned_to {
        match IdentityRef::parse(&raw) {
            Some(reference) => match find_identity(store, &reference).await? {
                Some(identity) => patch.assigned_to = Some(identity.id),
                None => errors.add(
                    "assignedTo",
                    format!("Invalid identity \"{}\" - object does not exist.", raw.trim()),
                ),
            },
            None => errors.add("assignedTo", REQUIRED_MESSAGE),
        }
    }

    if let Some(raw) = payload.due_date {
        match parse_due_date(&raw) {
            Ok(due_date) => patch.due_date = Some(due_date),
            Err(e) => errors.add("dueDate", e.to_string()),
        }
    }

    if let Some(raw) = payload.status {
        match raw.trim().parse::<TaskStatus>() {
            Ok(status) => patch.status = Some(status),
            Err(message) => errors.add("status", message),
        }
    }

    if let Some(value) = payload.worked_hours {
        match value.resolve() {
            Ok(Some(hours)) => patch.worked_hours = Some(hours),
            Ok(None) => changes.clear_hours = true,
            Err(e) => changes.hours_error = Some(e.to_string()),
        }
    }

    Ok((changes, errors))
}

async fn load_task<S: TaskStore>(state: &AppState<S>, id: Uuid) -> ServerResult<Task> {
    state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("Task {id}")))
}

/// Lists the tasks visible to the actor, most recent first.
pub async fn list_tasks<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    query: ListTasksQuery,
) -> ServerResult<(Vec<Task>, u32)> {
    let mut filter = TaskFilter::visible(policy::task_visibility(actor));
    if let Some(raw) = query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let status = raw
            .parse::<TaskStatus>()
            .map_err(|message| ServerError::field("status", message))?;
        filter = filter.with_status(status);
    }
    filter.limit = query.limit;
    filter.offset = query.offset;

    Ok(state.store.list_tasks(filter).await?)
}

/// Creates a task on behalf of an admin or superadmin.
///
/// The creator is always the actor; a creator in the payload is ignored.
pub async fn create_task<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    payload: TaskPayload,
) -> ServerResult<Task> {
    policy::authorize_task_create(actor).into_result()?;

    let (changes, mut errors) = decode_payload(&state.store, payload).await?;
    let patch = &changes.patch;
    if patch.assigned_to.is_none() && !errors.contains("assignedTo") {
        errors.add("assignedTo", REQUIRED_MESSAGE);
    }
    if patch.due_date.is_none() && !errors.contains("dueDate") {
        errors.add("dueDate", REQUIRED_MESSAGE);
    }

    let (Some(assigned_to), Some(due_date)) = (patch.assigned_to, patch.due_date) else {
        if patch.title.as_deref().is_none_or(str::is_empty) {
            errors.add("title", REQUIRED_MESSAGE);
        }
        let completing = patch.status == Some(TaskStatus::Completed);
        if let Some(message) = changes.hours_error.filter(|_| completing) {
            errors.add("workedHours", message);
        }
        return Err(errors.into());
    };
    let mut task = Task::new("", assigned_to, actor.id, due_date);
    changes.apply_to(&mut task, &mut errors);
    if let Err(lifecycle) = task.validate() {
        // A field that failed to decode already carries its error.
        errors.merge_missing(lifecycle);
    }
    errors.into_result()?;

    let task = state.store.create_task(task).await?;
    tracing::info!(
        task_id = %task.id,
        assigned_to = %task.assigned_to,
        created_by = %task.created_by,
        "Task created"
    );
    Ok(task)
}

/// Applies a partial update.
///
/// Ownership is checked before anything else; a user-role actor may then
/// only touch status, report and hours.
pub async fn update_task<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    id: Uuid,
    payload: TaskPayload,
) -> ServerResult<Task> {
    let task = load_task(state, id).await?;
    let assignee = state.store.get_profile(task.assigned_to).await?;
    policy::authorize_task_update(actor, &task, assignee.as_ref()).into_result()?;

    let (changes, mut errors) = decode_payload(&state.store, payload).await?;
    policy::authorize_task_detail_edit(actor, &task, &changes.patch).into_result()?;

    let mut updated = task;
    changes.apply_to(&mut updated, &mut errors);
    errors.into_result()?;
    let task = state.store.update_task(updated).await?;

    tracing::info!(
        task_id = %task.id,
        status = %task.status,
        updated_by = %actor.id,
        "Task updated"
    );
    Ok(task)
}

/// Returns a completed task for its report view.
pub async fn task_report<S: TaskStore>(
    state: &AppState<S>,
    actor: &Actor,
    id: Uuid,
) -> ServerResult<Task> {
    let task = load_task(state, id).await?;
    let assignee = state.store.get_profile(task.assigned_to).await?;
    policy::authorize_task_report(actor, &task, assignee.as_ref()).into_result()?;
    Ok(task)
}

//! Role-dependent dashboard aggregates.

use api_protocol::DashboardView;
use auth::{Actor, DashboardScope, policy};
use entities::{Role, Task, TaskStatus, TaskVisibility};
use task_store::{AccountFilter, TaskFilter, TaskStore};

use super::Usernames;
use crate::error::ServerResult;
use crate::state::AppState;

/// Number of recent tasks shown on a dashboard.
pub const RECENT_TASKS: u32 = 10;

struct TaskCounts {
    total: u32,
    completed: u32,
    recent: Vec<Task>,
}

async fn count_tasks<S: TaskStore>(store: &S, visibility: TaskVisibility) -> ServerResult<TaskCounts> {
    let (recent, total) = store
        .list_tasks(TaskFilter::visible(visibility).with_limit(RECENT_TASKS))
        .await?;
    let (_, completed) = store
        .list_tasks(
            TaskFilter::visible(visibility)
                .with_status(TaskStatus::Completed)
                .with_limit(0),
        )
        .await?;
    Ok(TaskCounts {
        total,
        completed,
        recent,
    })
}

/// Builds the dashboard for the actor's scope.
pub async fn dashboard<S: TaskStore>(state: &AppState<S>, actor: &Actor) -> ServerResult<DashboardView> {
    let store = &state.store;
    let mut usernames = Usernames::new(store);

    let view = match policy::dashboard_scope(actor) {
        DashboardScope::Global => {
            let counts = count_tasks(store, TaskVisibility::All).await?;
            DashboardView::Global {
                total_users: store.count_profiles(Role::User).await?,
                total_admins: store.count_profiles(Role::Admin).await?,
                total_tasks: counts.total,
                completed_tasks: counts.completed,
                recent_tasks: usernames.tasks(&counts.recent).await?,
            }
        }
        DashboardScope::Managed(admin_id) => {
            let (managed, managed_users) = store
                .list_accounts(AccountFilter::managed_by(admin_id))
                .await?;
            let counts = count_tasks(store, TaskVisibility::ManagedBy(admin_id)).await?;
            DashboardView::Managed {
                managed_users,
                total_tasks: counts.total,
                completed_tasks: counts.completed,
                recent_tasks: usernames.tasks(&counts.recent).await?,
                users: usernames.users(&managed).await?,
            }
        }
        DashboardScope::Personal(identity_id) => {
            let counts = count_tasks(store, TaskVisibility::AssignedTo(identity_id)).await?;
            DashboardView::Personal {
                total_tasks: counts.total,
                completed_tasks: counts.completed,
                recent_tasks: usernames.tasks(&counts.recent).await?,
            }
        }
    };
    Ok(view)
}

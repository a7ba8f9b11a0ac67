//! Response bodies and view models.

use chrono::{DateTime, Utc};
use entities::{Account, Role, Task, TaskStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public representation of an identity and its role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub assigned_admin_username: Option<String>,
}

impl UserView {
    pub fn new(account: &Account, assigned_admin_username: Option<String>) -> Self {
        let identity = &account.identity;
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            role: account.profile.role,
            assigned_admin_username,
        }
    }
}

/// Management listing entry: a user plus account state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(flatten)]
    pub user: UserView,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl AccountView {
    pub fn new(account: &Account, assigned_admin_username: Option<String>) -> Self {
        Self {
            user: UserView::new(account, assigned_admin_username),
            is_active: account.identity.is_active,
            date_joined: account.identity.created_at,
        }
    }
}

/// Public representation of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub assigned_to_username: String,
    pub created_by: Uuid,
    pub created_by_username: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub completion_report: Option<String>,
    pub worked_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskView {
    pub fn new(
        task: &Task,
        assigned_to_username: impl Into<String>,
        created_by_username: impl Into<String>,
    ) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            assigned_to: task.assigned_to,
            assigned_to_username: assigned_to_username.into(),
            created_by: task.created_by,
            created_by_username: created_by_username.into(),
            due_date: task.due_date,
            status: task.status,
            completion_report: task.completion_report.clone(),
            worked_hours: task.worked_hours,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Response of `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: UserView,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserView,
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Role-dependent dashboard, tagged by `scope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DashboardView {
    /// Superadmin view over the whole system.
    Global {
        total_users: u32,
        total_admins: u32,
        total_tasks: u32,
        completed_tasks: u32,
        recent_tasks: Vec<TaskView>,
    },
    /// Admin view over the users it oversees.
    Managed {
        managed_users: u32,
        total_tasks: u32,
        completed_tasks: u32,
        recent_tasks: Vec<TaskView>,
        users: Vec<UserView>,
    },
    /// User view over its own tasks.
    Personal {
        total_tasks: u32,
        completed_tasks: u32,
        recent_tasks: Vec<TaskView>,
    },
}

/// Panel task list view model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelTasksView {
    pub tasks: Vec<TaskView>,
    pub can_create: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

/// Panel user/admin list view model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelAccountsView {
    pub accounts: Vec<AccountView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

/// Panel home view model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelHomeView {
    pub user: UserView,
    pub dashboard: DashboardView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

/// Panel login view model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelLoginView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

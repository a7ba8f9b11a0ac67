//! Request payloads for the JSON API and the panel forms.

use serde::{Deserialize, Serialize};

use crate::HoursValue;

// ============================================================================
// JSON API
// ============================================================================

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    /// Honoured only when the server allows role selection.
    pub role: Option<String>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Task fields as sent by a client.
///
/// Used whole for creation and as a partial update, where an absent field
/// stays unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Identity UUID or username.
    pub assigned_to: Option<String>,
    /// RFC 3339 or naive `YYYY-MM-DDTHH:MM[:SS]` in UTC.
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub completion_report: Option<String>,
    pub worked_hours: Option<HoursValue>,
}

/// Body of `POST /api/tasks`.
pub type CreateTaskRequest = TaskPayload;

/// Body of `PUT /api/tasks/:id`.
pub type UpdateTaskRequest = TaskPayload;

/// Query string of `GET /api/tasks`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// ============================================================================
// Panel forms (form-encoded, snake_case field names)
// ============================================================================

/// Query string of panel pages; carries the message of the last redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashQuery {
    pub flash: Option<String>,
}

/// `POST /panel/login`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// User or admin create/update form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Checkbox; absent means inactive.
    pub is_active: Option<String>,
    pub password: String,
    pub password_confirm: String,
    pub role: Option<String>,
    /// Identity UUID or username of the overseeing admin.
    pub assigned_admin: Option<String>,
}

/// `POST /panel/assign-user`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignUserForm {
    /// Identity UUID or username.
    pub user: String,
    /// Identity UUID or username.
    pub admin: String,
}

/// Task create/update form. Absent fields stay unchanged on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub completion_report: Option<String>,
    pub worked_hours: Option<String>,
}

impl From<TaskForm> for TaskPayload {
    fn from(form: TaskForm) -> Self {
        Self {
            title: form.title,
            description: form.description,
            assigned_to: form.assigned_to,
            due_date: form.due_date,
            status: form.status,
            completion_report: form.completion_report,
            worked_hours: form.worked_hours.map(HoursValue::Text),
        }
    }
}

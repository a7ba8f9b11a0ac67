use chrono::{DateTime, Utc};
use entities::{Account, Identity, Profile, Role, Task, TaskStatus};
use sqlx::FromRow;
use uuid::Uuid;

use crate::TaskStoreError;

/// Tables for identities, profiles and tasks.
///
/// Timestamps are microseconds since the Unix epoch. An empty email is
/// stored as NULL so it never collides with another empty email.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS identities (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    email TEXT UNIQUE,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    password_hash TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    identity_id TEXT PRIMARY KEY NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin', 'superadmin')),
    assigned_admin TEXT REFERENCES identities(id) ON DELETE SET NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    assigned_to TEXT NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    created_by TEXT NOT NULL REFERENCES identities(id) ON DELETE CASCADE,
    due_date INTEGER NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'in_progress', 'completed')),
    completion_report TEXT,
    worked_hours REAL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_profiles_role ON profiles(role);
CREATE INDEX IF NOT EXISTS idx_profiles_assigned_admin ON profiles(assigned_admin);
CREATE INDEX IF NOT EXISTS idx_tasks_assigned_to ON tasks(assigned_to);
CREATE INDEX IF NOT EXISTS idx_tasks_created_by ON tasks(created_by);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
"#;

/// Columns selected for [`AccountRow`]; identities joined with profiles.
pub const ACCOUNT_COLUMNS: &str = "i.id, i.username, i.email, i.first_name, i.last_name, \
     i.password_hash, i.is_active, i.created_at, i.updated_at, \
     p.role, p.assigned_admin, \
     p.created_at AS profile_created_at, p.updated_at AS profile_updated_at";

/// Columns selected for [`TaskRow`].
pub const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.assigned_to, t.created_by, \
     t.due_date, t.status, t.completion_report, t.worked_hours, t.created_at, t.updated_at";

pub fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, TaskStoreError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| TaskStoreError::Corrupt(format!("timestamp out of range: {micros}")))
}

fn parse_id(raw: &str) -> Result<Uuid, TaskStoreError> {
    raw.parse()
        .map_err(|_| TaskStoreError::Corrupt(format!("invalid id: {raw}")))
}

fn parse_role(raw: &str) -> Result<Role, TaskStoreError> {
    raw.parse().map_err(TaskStoreError::Corrupt)
}

/// Database row for an identity and its (possibly missing) profile.
#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub role: Option<String>,
    pub assigned_admin: Option<String>,
    pub profile_created_at: Option<i64>,
    pub profile_updated_at: Option<i64>,
}

impl TryFrom<AccountRow> for Account {
    type Error = TaskStoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = parse_id(&row.id)?;
        let identity = Identity {
            id,
            username: row.username,
            email: row.email.unwrap_or_default(),
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
        };

        // A missing profile reads as the default `user` profile.
        let profile = match (row.role, row.profile_created_at, row.profile_updated_at) {
            (Some(role), Some(created_at), Some(updated_at)) => Profile {
                identity_id: id,
                role: parse_role(&role)?,
                assigned_admin: row.assigned_admin.as_deref().map(parse_id).transpose()?,
                created_at: from_micros(created_at)?,
                updated_at: from_micros(updated_at)?,
            },
            _ => Profile::new(id),
        };

        Ok(Account::new(identity, profile))
    }
}

/// Database row for a profile.
#[derive(Debug, FromRow)]
pub struct ProfileRow {
    pub identity_id: String,
    pub role: String,
    pub assigned_admin: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = TaskStoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            identity_id: parse_id(&row.identity_id)?,
            role: parse_role(&row.role)?,
            assigned_admin: row.assigned_admin.as_deref().map(parse_id).transpose()?,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
        })
    }
}

/// Database row for a task.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub created_by: String,
    pub due_date: i64,
    pub status: String,
    pub completion_report: Option<String>,
    pub worked_hours: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<TaskRow> for Task {
    type Error = TaskStoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let status: TaskStatus = row.status.parse().map_err(TaskStoreError::Corrupt)?;

        Ok(Task {
            id: parse_id(&row.id)?,
            title: row.title,
            description: row.description,
            assigned_to: parse_id(&row.assigned_to)?,
            created_by: parse_id(&row.created_by)?,
            due_date: from_micros(row.due_date)?,
            status,
            completion_report: row.completion_report,
            worked_hours: row.worked_hours,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
        })
    }
}

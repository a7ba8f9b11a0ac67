//! SQLite-backed task store.

mod schema;

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use entities::{Account, Identity, Profile, Role, Task, TaskVisibility};
use schema::*;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::{AccountFilter, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult};

/// Task store persisted in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    pool: Pool<Sqlite>,
}

impl SqliteTaskStore {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    ///
    /// A `:memory:` URL gets the single-connection pool of [`Self::connect_in_memory`].
    pub async fn connect(url: &str) -> TaskStoreResult<Self> {
        if url.contains(":memory:") {
            return Self::connect_in_memory().await;
        }
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since each
    /// SQLite memory connection is its own database.
    pub async fn connect_in_memory() -> TaskStoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: Pool<Sqlite>) -> TaskStoreResult<Self> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> TaskStoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        tracing::debug!("SQLite schema ready");
        Ok(())
    }

    fn account_query(select: &str, filter: &AccountFilter) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {select} FROM identities i LEFT JOIN profiles p ON p.identity_id = i.id WHERE 1 = 1"
        ));

        if let Some(roles) = &filter.roles {
            if roles.is_empty() {
                qb.push(" AND 0");
            } else {
                qb.push(" AND COALESCE(p.role, 'user') IN (");
                let mut separated = qb.separated(", ");
                for role in roles {
                    separated.push_bind(role.as_str());
                }
                separated.push_unseparated(")");
            }
        }
        if let Some(admin_id) = filter.assigned_admin {
            qb.push(" AND p.assigned_admin = ").push_bind(admin_id.to_string());
        }

        qb
    }

    fn task_query(select: &str, filter: &TaskFilter) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {select} FROM tasks t LEFT JOIN profiles p ON p.identity_id = t.assigned_to WHERE 1 = 1"
        ));

        match filter.visibility {
            TaskVisibility::All => {}
            TaskVisibility::AssignedTo(id) => {
                qb.push(" AND t.assigned_to = ").push_bind(id.to_string());
            }
            TaskVisibility::ManagedBy(admin) => {
                qb.push(" AND p.assigned_admin = ").push_bind(admin.to_string());
            }
            TaskVisibility::AdminScope(admin) => {
                let admin = admin.to_string();
                qb.push(" AND (p.assigned_admin = ")
                    .push_bind(admin.clone())
                    .push(" OR t.assigned_to = ")
                    .push_bind(admin.clone())
                    .push(" OR t.created_by = ")
                    .push_bind(admin)
                    .push(")");
            }
        }
        if let Some(status) = filter.status {
            qb.push(" AND t.status = ").push_bind(status.as_str());
        }

        qb
    }
}

fn push_pagination(qb: &mut QueryBuilder<'static, Sqlite>, limit: Option<u32>, offset: Option<u32>) {
    if limit.is_none() && offset.is_none() {
        return;
    }
    // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
    qb.push(" LIMIT ")
        .push_bind(limit.map_or(-1, i64::from))
        .push(" OFFSET ")
        .push_bind(i64::from(offset.unwrap_or(0)));
}

fn constraint_error(err: sqlx::Error) -> TaskStoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return TaskStoreError::ForeignKeyViolation(db_err.message().to_string());
        }
    }
    err.into()
}

fn identity_write_error(err: sqlx::Error, identity: &Identity) -> TaskStoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("identities.username") {
                return TaskStoreError::unique("username", &identity.username);
            }
            if message.contains("identities.email") {
                return TaskStoreError::unique("email", &identity.email);
            }
            return TaskStoreError::already_exists("Identity", identity.id.to_string());
        }
    }
    constraint_error(err)
}

fn task_write_error(err: sqlx::Error, task: &Task) -> TaskStoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return TaskStoreError::already_exists("Task", task.id.to_string());
        }
    }
    constraint_error(err)
}

async fn upsert_profile(
    conn: &mut sqlx::SqliteConnection,
    profile: &Profile,
) -> TaskStoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (identity_id, role, assigned_admin, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(identity_id) DO UPDATE SET
            role = excluded.role,
            assigned_admin = excluded.assigned_admin,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(profile.identity_id.to_string())
    .bind(profile.role.as_str())
    .bind(profile.assigned_admin.map(|id| id.to_string()))
    .bind(to_micros(profile.created_at))
    .bind(to_micros(profile.updated_at))
    .execute(conn)
    .await
    .map_err(constraint_error)?;
    Ok(())
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    // =========================================================================
    // Identity operations
    // =========================================================================

    async fn create_account(
        &self,
        identity: Identity,
        mut profile: Profile,
    ) -> TaskStoreResult<Account> {
        profile.identity_id = identity.id;
        profile.normalize();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO identities (
                id, username, email, first_name, last_name,
                password_hash, is_active, created_at, updated_at
            )
            VALUES (?, ?, NULLIF(?, ''), ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(identity.id.to_string())
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.password_hash)
        .bind(identity.is_active)
        .bind(to_micros(identity.created_at))
        .bind(to_micros(identity.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| identity_write_error(e, &identity))?;

        upsert_profile(&mut tx, &profile).await?;
        tx.commit().await?;

        Ok(Account::new(identity, profile))
    }

    async fn get_identity(&self, id: Uuid) -> TaskStoreResult<Option<Identity>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM identities i \
             LEFT JOIN profiles p ON p.identity_id = i.id WHERE i.id = ?"
        );
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Account::try_from(r).map(|a| a.identity))
            .transpose()
    }

    async fn get_identity_by_username(&self, username: &str) -> TaskStoreResult<Option<Identity>> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM identities i \
             LEFT JOIN profiles p ON p.identity_id = i.id WHERE i.username = ?"
        );
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| Account::try_from(r).map(|a| a.identity))
            .transpose()
    }

    async fn list_accounts(&self, filter: AccountFilter) -> TaskStoreResult<(Vec<Account>, u32)> {
        let total: i64 = Self::account_query("COUNT(*)", &filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = Self::account_query(ACCOUNT_COLUMNS, &filter);
        qb.push(" ORDER BY i.username");
        push_pagination(&mut qb, filter.limit, filter.offset);
        let rows: Vec<AccountRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let accounts = rows
            .into_iter()
            .map(Account::try_from)
            .collect::<TaskStoreResult<Vec<_>>>()?;
        Ok((accounts, total as u32))
    }

    async fn update_account(&self, account: Account) -> TaskStoreResult<Account> {
        let Account {
            mut identity,
            mut profile,
        } = account;
        let now = Utc::now();
        identity.updated_at = now;
        profile.identity_id = identity.id;
        profile.updated_at = now;
        profile.normalize();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE identities SET
                username = ?, email = NULLIF(?, ''), first_name = ?, last_name = ?,
                password_hash = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.first_name)
        .bind(&identity.last_name)
        .bind(&identity.password_hash)
        .bind(identity.is_active)
        .bind(to_micros(identity.updated_at))
        .bind(identity.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| identity_write_error(e, &identity))?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found("Identity", identity.id.to_string()));
        }

        upsert_profile(&mut tx, &profile).await?;
        tx.commit().await?;

        Ok(Account::new(identity, profile))
    }

    async fn delete_identity(&self, id: Uuid) -> TaskStoreResult<()> {
        // Profile and task rows follow through ON DELETE clauses.
        let result = sqlx::query("DELETE FROM identities WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found("Identity", id.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Profile operations
    // =========================================================================

    async fn get_profile(&self, identity_id: Uuid) -> TaskStoreResult<Option<Profile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT identity_id, role, assigned_admin, created_at, updated_at \
             FROM profiles WHERE identity_id = ?",
        )
        .bind(identity_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn ensure_profile(&self, identity_id: Uuid) -> TaskStoreResult<Profile> {
        let id = identity_id.to_string();
        let mut tx = self.pool.begin().await?;

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM identities WHERE id = ?")
            .bind(&id)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Err(TaskStoreError::not_found("Identity", id));
        }

        let now = to_micros(Utc::now());
        let inserted = sqlx::query(
            r#"
            INSERT INTO profiles (identity_id, role, assigned_admin, created_at, updated_at)
            VALUES (?, 'user', NULL, ?, ?)
            ON CONFLICT(identity_id) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() > 0 {
            tracing::warn!(identity_id = %identity_id, "Creating missing profile");
        }

        let row: ProfileRow = sqlx::query_as(
            "SELECT identity_id, role, assigned_admin, created_at, updated_at \
             FROM profiles WHERE identity_id = ?",
        )
        .bind(&id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Profile::try_from(row)
    }

    async fn update_profile(&self, mut profile: Profile) -> TaskStoreResult<Profile> {
        profile.normalize();
        profile.updated_at = Utc::now();

        let result = sqlx::query(
            "UPDATE profiles SET role = ?, assigned_admin = ?, updated_at = ? WHERE identity_id = ?",
        )
        .bind(profile.role.as_str())
        .bind(profile.assigned_admin.map(|id| id.to_string()))
        .bind(to_micros(profile.updated_at))
        .bind(profile.identity_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(constraint_error)?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::not_found(
                "Profile",
                profile.identity_id.to_string(),
            ));
        }
        Ok(profile)
    }

    async fn count_profiles(&self, role: Role) -> TaskStoreResult<u32> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM identities i LEFT JOIN profiles p ON p.identity_id = i.id \
             WHERE COALESCE(p.role, 'user') = ?",
        )
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u32)
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, mut task: Task) -> TaskStoreResult<Task> {
        task.prepare_for_save()?;

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, title, description, assigned_to, created_by, due_date,
                status, completion_report, worked_hours, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_to.to_string())
        .bind(task.created_by.to_string())
        .bind(to_micros(task.due_date))
        .bind(task.status.as_str())
        .bind(&task.completion_report)
        .bind(task.worked_hours)
        .bind(to_micros(task.created_at))
        .bind(to_micros(task.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| task_write_error(e, &task))?;

        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?");
        let row: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Task::try_from).transpose()
    }

    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<(Vec<Task>, u32)> {
        let total: i64 = Self::task_query("COUNT(*)", &filter)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = Self::task_query(TASK_COLUMNS, &filter);
        qb.push(" ORDER BY t.created_at DESC, t.rowid DESC");
        push_pagination(&mut qb, filter.limit, filter.offset);
        let rows: Vec<TaskRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let tasks = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<TaskStoreResult<Vec<_>>>()?;
        Ok((tasks, total as u32))
    }

    async fn update_task(&self, mut task: Task) -> TaskStoreResult<Task> {
        task.prepare_for_save()?;
        task.touch();

        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?");
        let existing: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(task.id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let existing = match existing {
            Some(row) => Task::try_from(row)?,
            None => return Err(TaskStoreError::not_found("Task", task.id.to_string())),
        };
        task.created_by = existing.created_by;
        task.created_at = existing.created_at;

        sqlx::query(
            r#"
            UPDATE tasks SET
                title = ?, description = ?, assigned_to = ?, due_date = ?,
                status = ?, completion_report = ?, worked_hours = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_to.to_string())
        .bind(to_micros(task.due_date))
        .bind(task.status.as_str())
        .bind(&task.completion_report)
        .bind(task.worked_hours)
        .bind(to_micros(task.updated_at))
        .bind(task.id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| task_write_error(e, &task))?;
        tx.commit().await?;

        Ok(task)
    }
}

//! Task store trait definitions.

use async_trait::async_trait;
use entities::{Account, Identity, Profile, Role, Task, TaskStatus, TaskVisibility};
use uuid::Uuid;

use crate::TaskStoreResult;

/// Filter options for listing tasks.
///
/// Results are ordered most-recently-created first.
#[derive(Debug, Clone)]
pub struct TaskFilter {
    /// Which tasks the caller may see.
    pub visibility: TaskVisibility,
    /// Filter by status.
    pub status: Option<TaskStatus>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

impl Default for TaskFilter {
    fn default() -> Self {
        Self::visible(TaskVisibility::All)
    }
}

impl TaskFilter {
    /// A filter with the given visibility and no other restriction.
    pub fn visible(visibility: TaskVisibility) -> Self {
        Self {
            visibility,
            status: None,
            limit: None,
            offset: None,
        }
    }

    /// Restricts the filter to one status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Caps the number of returned tasks.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Filter options for listing accounts.
///
/// Results are ordered by username.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Keep only accounts with one of these roles.
    pub roles: Option<Vec<Role>>,
    /// Keep only accounts overseen by this admin.
    pub assigned_admin: Option<Uuid>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset for pagination.
    pub offset: Option<u32>,
}

impl AccountFilter {
    /// Accounts holding any of `roles`.
    pub fn with_roles(roles: &[Role]) -> Self {
        Self {
            roles: Some(roles.to_vec()),
            ..Default::default()
        }
    }

    /// Accounts overseen by `admin_id`.
    pub fn managed_by(admin_id: Uuid) -> Self {
        Self {
            assigned_admin: Some(admin_id),
            ..Default::default()
        }
    }

    pub(crate) fn matches(&self, profile: &Profile) -> bool {
        let role_ok = self
            .roles
            .as_ref()
            .is_none_or(|roles| roles.contains(&profile.role));
        let admin_ok = self
            .assigned_admin
            .is_none_or(|admin| profile.assigned_admin == Some(admin));
        role_ok && admin_ok
    }
}

/// Trait for identity, profile and task storage.
///
/// Every write is atomic: it either applies completely or leaves the store
/// unchanged. Task writes run [`Task::prepare_for_save`] before persisting.
#[async_trait]
pub trait TaskStore: Send + Sync {
    // =========================================================================
    // Identity operations
    // =========================================================================

    /// Creates an identity together with its profile.
    ///
    /// Fails with `UniqueViolation` on a taken username or non-empty email.
    async fn create_account(&self, identity: Identity, profile: Profile)
        -> TaskStoreResult<Account>;

    /// Gets an identity by ID.
    async fn get_identity(&self, id: Uuid) -> TaskStoreResult<Option<Identity>>;

    /// Gets an identity by username.
    async fn get_identity_by_username(&self, username: &str)
        -> TaskStoreResult<Option<Identity>>;

    /// Lists accounts with optional filters.
    async fn list_accounts(&self, filter: AccountFilter) -> TaskStoreResult<(Vec<Account>, u32)>;

    /// Updates an identity and its profile together.
    async fn update_account(&self, account: Account) -> TaskStoreResult<Account>;

    /// Deletes an identity.
    ///
    /// Its profile and every task it is assigned to or created go with it;
    /// profiles it oversaw lose their admin assignment.
    async fn delete_identity(&self, id: Uuid) -> TaskStoreResult<()>;

    // =========================================================================
    // Profile operations
    // =========================================================================

    /// Gets the profile of an identity.
    async fn get_profile(&self, identity_id: Uuid) -> TaskStoreResult<Option<Profile>>;

    /// Returns the identity's profile, creating the default `user` profile
    /// first if it is missing. Idempotent.
    async fn ensure_profile(&self, identity_id: Uuid) -> TaskStoreResult<Profile>;

    /// Updates an existing profile.
    async fn update_profile(&self, profile: Profile) -> TaskStoreResult<Profile>;

    /// Counts identities holding `role`; one without a profile counts as a user.
    async fn count_profiles(&self, role: Role) -> TaskStoreResult<u32>;

    // =========================================================================
    // Task operations
    // =========================================================================

    /// Creates a new task.
    async fn create_task(&self, task: Task) -> TaskStoreResult<Task>;

    /// Gets a task by ID.
    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>>;

    /// Lists tasks with the filter applied, returning the page and the total
    /// number of matching tasks.
    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<(Vec<Task>, u32)>;

    /// Updates a task.
    async fn update_task(&self, task: Task) -> TaskStoreResult<Task>;
}

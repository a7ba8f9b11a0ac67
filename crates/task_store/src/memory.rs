//! In-memory task store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use entities::{Account, Identity, Profile, Role, Task};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AccountFilter, TaskFilter, TaskStore, TaskStoreError, TaskStoreResult};

#[derive(Debug, Default)]
struct MemoryState {
    identities: HashMap<Uuid, Identity>,
    profiles: HashMap<Uuid, Profile>,
    /// Tasks in insertion order.
    tasks: Vec<Task>,
}

impl MemoryState {
    fn check_unique(&self, identity: &Identity) -> TaskStoreResult<()> {
        for other in self.identities.values().filter(|o| o.id != identity.id) {
            if other.username == identity.username {
                return Err(TaskStoreError::unique("username", &identity.username));
            }
            if !identity.email.is_empty() && other.email == identity.email {
                return Err(TaskStoreError::unique("email", &identity.email));
            }
        }
        Ok(())
    }

    fn check_identity_exists(&self, id: Uuid) -> TaskStoreResult<()> {
        if self.identities.contains_key(&id) {
            Ok(())
        } else {
            Err(TaskStoreError::ForeignKeyViolation(format!(
                "identity {id} does not exist"
            )))
        }
    }

    fn check_profile_refs(&self, profile: &Profile) -> TaskStoreResult<()> {
        match profile.assigned_admin {
            Some(admin_id) => self.check_identity_exists(admin_id),
            None => Ok(()),
        }
    }

    fn check_task_refs(&self, task: &Task) -> TaskStoreResult<()> {
        self.check_identity_exists(task.assigned_to)?;
        self.check_identity_exists(task.created_by)
    }

    /// Profiles may lag behind identities; a missing one reads as `user`.
    fn profile_or_default(&self, identity_id: Uuid) -> Profile {
        self.profiles
            .get(&identity_id)
            .cloned()
            .unwrap_or_else(|| Profile::new(identity_id))
    }

    fn assignee_admin(&self, task: &Task) -> Option<Uuid> {
        self.profiles
            .get(&task.assigned_to)
            .and_then(|p| p.assigned_admin)
    }
}

/// In-memory task store, used by default and in tests.
///
/// One lock guards all collections so multi-record writes are atomic.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    state: RwLock<MemoryState>,
}

impl MemoryTaskStore {
    /// Creates a new in-memory task store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(items: Vec<T>, offset: Option<u32>, limit: Option<u32>) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.unwrap_or(0) as usize)
        .take(limit.map_or(usize::MAX, |l| l as usize))
        .collect()
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    // =========================================================================
    // Identity operations
    // =========================================================================

    async fn create_account(
        &self,
        identity: Identity,
        mut profile: Profile,
    ) -> TaskStoreResult<Account> {
        let mut state = self.state.write().await;
        if state.identities.contains_key(&identity.id) {
            return Err(TaskStoreError::already_exists(
                "Identity",
                identity.id.to_string(),
            ));
        }
        state.check_unique(&identity)?;

        profile.identity_id = identity.id;
        profile.normalize();
        state.check_profile_refs(&profile)?;

        state.identities.insert(identity.id, identity.clone());
        state.profiles.insert(identity.id, profile.clone());
        Ok(Account::new(identity, profile))
    }

    async fn get_identity(&self, id: Uuid) -> TaskStoreResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state.identities.get(&id).cloned())
    }

    async fn get_identity_by_username(&self, username: &str) -> TaskStoreResult<Option<Identity>> {
        let state = self.state.read().await;
        Ok(state
            .identities
            .values()
            .find(|i| i.username == username)
            .cloned())
    }

    async fn list_accounts(&self, filter: AccountFilter) -> TaskStoreResult<(Vec<Account>, u32)> {
        let state = self.state.read().await;
        let mut result: Vec<Account> = state
            .identities
            .values()
            .map(|identity| Account::new(identity.clone(), state.profile_or_default(identity.id)))
            .filter(|account| filter.matches(&account.profile))
            .collect();
        result.sort_by(|a, b| a.identity.username.cmp(&b.identity.username));

        let total = result.len() as u32;
        Ok((paginate(result, filter.offset, filter.limit), total))
    }

    async fn update_account(&self, account: Account) -> TaskStoreResult<Account> {
        let Account {
            mut identity,
            mut profile,
        } = account;

        let mut state = self.state.write().await;
        if !state.identities.contains_key(&identity.id) {
            return Err(TaskStoreError::not_found("Identity", identity.id.to_string()));
        }
        state.check_unique(&identity)?;

        profile.identity_id = identity.id;
        profile.normalize();
        state.check_profile_refs(&profile)?;

        let now = Utc::now();
        identity.updated_at = now;
        profile.updated_at = now;
        state.identities.insert(identity.id, identity.clone());
        state.profiles.insert(identity.id, profile.clone());
        Ok(Account::new(identity, profile))
    }

    async fn delete_identity(&self, id: Uuid) -> TaskStoreResult<()> {
        let mut state = self.state.write().await;
        if state.identities.remove(&id).is_none() {
            return Err(TaskStoreError::not_found("Identity", id.to_string()));
        }
        state.profiles.remove(&id);
        state
            .tasks
            .retain(|task| task.assigned_to != id && task.created_by != id);
        for profile in state.profiles.values_mut() {
            if profile.assigned_admin == Some(id) {
                profile.assigned_admin = None;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Profile operations
    // =========================================================================

    async fn get_profile(&self, identity_id: Uuid) -> TaskStoreResult<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&identity_id).cloned())
    }

    async fn ensure_profile(&self, identity_id: Uuid) -> TaskStoreResult<Profile> {
        let mut state = self.state.write().await;
        if !state.identities.contains_key(&identity_id) {
            return Err(TaskStoreError::not_found("Identity", identity_id.to_string()));
        }
        let profile = state.profiles.entry(identity_id).or_insert_with(|| {
            tracing::warn!(identity_id = %identity_id, "Creating missing profile");
            Profile::new(identity_id)
        });
        Ok(profile.clone())
    }

    async fn update_profile(&self, mut profile: Profile) -> TaskStoreResult<Profile> {
        let mut state = self.state.write().await;
        if !state.profiles.contains_key(&profile.identity_id) {
            return Err(TaskStoreError::not_found(
                "Profile",
                profile.identity_id.to_string(),
            ));
        }
        profile.normalize();
        state.check_profile_refs(&profile)?;
        profile.updated_at = Utc::now();
        state.profiles.insert(profile.identity_id, profile.clone());
        Ok(profile)
    }

    async fn count_profiles(&self, role: Role) -> TaskStoreResult<u32> {
        let state = self.state.read().await;
        let count = state
            .identities
            .keys()
            .filter(|id| state.profile_or_default(**id).role == role)
            .count();
        Ok(count as u32)
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, mut task: Task) -> TaskStoreResult<Task> {
        task.prepare_for_save()?;

        let mut state = self.state.write().await;
        if state.tasks.iter().any(|t| t.id == task.id) {
            return Err(TaskStoreError::already_exists("Task", task.id.to_string()));
        }
        state.check_task_refs(&task)?;
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> TaskStoreResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> TaskStoreResult<(Vec<Task>, u32)> {
        let state = self.state.read().await;
        let mut result: Vec<Task> = state
            .tasks
            .iter()
            .rev()
            .filter(|task| {
                filter
                    .visibility
                    .matches(task, state.assignee_admin(task))
            })
            .filter(|task| filter.status.is_none_or(|status| task.status == status))
            .cloned()
            .collect();
        // Stable sort keeps later insertions first among equal timestamps.
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = result.len() as u32;
        Ok((paginate(result, filter.offset, filter.limit), total))
    }

    async fn update_task(&self, mut task: Task) -> TaskStoreResult<Task> {
        task.prepare_for_save()?;

        let mut state = self.state.write().await;
        state.check_task_refs(&task)?;
        let slot = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| TaskStoreError::not_found("Task", task.id.to_string()))?;

        task.created_by = slot.created_by;
        task.created_at = slot.created_at;
        task.touch();
        *slot = task.clone();
        Ok(task)
    }
}

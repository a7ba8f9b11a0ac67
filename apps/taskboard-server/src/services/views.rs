//! View-model assembly.

use std::collections::HashMap;

use api_protocol::{AccountView, TaskView, UserView};
use entities::{Account, Task};
use task_store::TaskStore;
use uuid::Uuid;

use crate::error::ServerResult;

/// Resolves usernames for a batch of records, looking each identity up once.
pub struct Usernames<'a, S: TaskStore> {
    store: &'a S,
    cache: HashMap<Uuid, Option<String>>,
}

impl<'a, S: TaskStore> Usernames<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    /// Returns the username of the identity, or `None` if it is gone.
    pub async fn get(&mut self, id: Uuid) -> ServerResult<Option<String>> {
        if let Some(username) = self.cache.get(&id) {
            return Ok(username.clone());
        }
        let username = self.store.get_identity(id).await?.map(|i| i.username);
        self.cache.insert(id, username.clone());
        Ok(username)
    }

    pub async fn task(&mut self, task: &Task) -> ServerResult<TaskView> {
        let assigned_to = self.get(task.assigned_to).await?.unwrap_or_default();
        let created_by = self.get(task.created_by).await?.unwrap_or_default();
        Ok(TaskView::new(task, assigned_to, created_by))
    }

    pub async fn tasks(&mut self, tasks: &[Task]) -> ServerResult<Vec<TaskView>> {
        let mut views = Vec::with_capacity(tasks.len());
        for task in tasks {
            views.push(self.task(task).await?);
        }
        Ok(views)
    }

    pub async fn user(&mut self, account: &Account) -> ServerResult<UserView> {
        let admin = match account.profile.assigned_admin {
            Some(admin_id) => self.get(admin_id).await?,
            None => None,
        };
        Ok(UserView::new(account, admin))
    }

    pub async fn users(&mut self, accounts: &[Account]) -> ServerResult<Vec<UserView>> {
        let mut views = Vec::with_capacity(accounts.len());
        for account in accounts {
            views.push(self.user(account).await?);
        }
        Ok(views)
    }

    pub async fn accounts(&mut self, accounts: &[Account]) -> ServerResult<Vec<AccountView>> {
        // Listed accounts are usually each other's admins.
        for account in accounts {
            self.cache
                .insert(account.identity.id, Some(account.identity.username.clone()));
        }

        let mut views = Vec::with_capacity(accounts.len());
        for account in accounts {
            let admin = match account.profile.assigned_admin {
                Some(admin_id) => self.get(admin_id).await?,
                None => None,
            };
            views.push(AccountView::new(account, admin));
        }
        Ok(views)
    }
}

/// Renders a single task.
pub async fn task_view<S: TaskStore>(store: &S, task: &Task) -> ServerResult<TaskView> {
    Usernames::new(store).task(task).await
}

/// Renders a single user.
pub async fn user_view<S: TaskStore>(store: &S, account: &Account) -> ServerResult<UserView> {
    Usernames::new(store).user(account).await
}

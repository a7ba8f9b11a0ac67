//! Behaviour every [`TaskStore`] implementation must share.

use chrono::{Duration, Utc};
use entities::{Identity, Profile, Role, Task, TaskStatus, TaskVisibility};
use uuid::Uuid;

use crate::{AccountFilter, TaskFilter, TaskStore, TaskStoreError};

async fn account(store: &impl TaskStore, username: &str, role: Role) -> Uuid {
    let identity = Identity::new(username).with_email(format!("{username}@example.com"));
    let profile = Profile::new(identity.id).with_role(role);
    store
        .create_account(identity, profile)
        .await
        .unwrap()
        .identity
        .id
}

async fn managed_user(store: &impl TaskStore, username: &str, admin: Uuid) -> Uuid {
    let identity = Identity::new(username);
    let profile = Profile::new(identity.id).with_assigned_admin(admin);
    store
        .create_account(identity, profile)
        .await
        .unwrap()
        .identity
        .id
}

fn task(title: &str, assigned_to: Uuid, created_by: Uuid) -> Task {
    Task::new(title, assigned_to, created_by, Utc::now() + Duration::days(3))
}

pub(crate) async fn account_crud(store: &impl TaskStore) {
    let identity = Identity::new("alice")
        .with_email("alice@example.com")
        .with_name("Alice", "Liddell")
        .with_password_hash("sha256$1$c2FsdA$ZGlnZXN0");
    let id = identity.id;
    let created = store
        .create_account(identity, Profile::new(Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(created.profile.identity_id, id);
    assert_eq!(created.profile.role, Role::User);

    let fetched = store.get_identity(id).await.unwrap().unwrap();
    assert_eq!(fetched.username, "alice");
    assert_eq!(fetched.last_name, "Liddell");
    assert_eq!(
        fetched.password_hash.as_deref(),
        Some("sha256$1$c2FsdA$ZGlnZXN0")
    );
    assert!(fetched.is_active);

    let by_name = store.get_identity_by_username("alice").await.unwrap();
    assert_eq!(by_name.map(|i| i.id), Some(id));
    assert!(store.get_identity_by_username("nobody").await.unwrap().is_none());

    let mut account = created;
    account.identity.first_name = "Alicia".to_string();
    account.identity.is_active = false;
    account.profile.role = Role::Admin;
    let updated = store.update_account(account).await.unwrap();
    assert_eq!(updated.identity.first_name, "Alicia");

    let profile = store.get_profile(id).await.unwrap().unwrap();
    assert_eq!(profile.role, Role::Admin);
    assert!(!store.get_identity(id).await.unwrap().unwrap().is_active);
    assert_eq!(store.count_profiles(Role::Admin).await.unwrap(), 1);
    assert_eq!(store.count_profiles(Role::User).await.unwrap(), 0);

    store.delete_identity(id).await.unwrap();
    assert!(store.get_identity(id).await.unwrap().is_none());
    assert!(store.get_profile(id).await.unwrap().is_none());
    assert!(matches!(
        store.delete_identity(id).await,
        Err(TaskStoreError::NotFound { .. })
    ));
}

pub(crate) async fn unique_username_and_email(store: &impl TaskStore) {
    account(store, "bob", Role::User).await;

    let dup_name = Identity::new("bob");
    let result = store
        .create_account(dup_name.clone(), Profile::new(dup_name.id))
        .await;
    assert!(matches!(
        result,
        Err(TaskStoreError::UniqueViolation { field: "username", .. })
    ));

    let dup_email = Identity::new("robert").with_email("bob@example.com");
    let result = store
        .create_account(dup_email.clone(), Profile::new(dup_email.id))
        .await;
    assert!(matches!(
        result,
        Err(TaskStoreError::UniqueViolation { field: "email", .. })
    ));

    // Empty emails never collide.
    account_without_email(store, "carol").await;
    account_without_email(store, "dave").await;

    let (accounts, total) = store.list_accounts(AccountFilter::default()).await.unwrap();
    assert_eq!(total, 3);
    let names: Vec<_> = accounts.iter().map(|a| a.identity.username.as_str()).collect();
    assert_eq!(names, ["bob", "carol", "dave"]);
}

async fn account_without_email(store: &impl TaskStore, username: &str) {
    let identity = Identity::new(username);
    store
        .create_account(identity.clone(), Profile::new(identity.id))
        .await
        .unwrap();
}

pub(crate) async fn ensure_profile_is_idempotent(store: &impl TaskStore) {
    let admin = account(store, "boss", Role::Admin).await;

    let first = store.ensure_profile(admin).await.unwrap();
    let second = store.ensure_profile(admin).await.unwrap();
    assert_eq!(first.role, Role::Admin);
    assert_eq!(second.role, Role::Admin);
    assert_eq!(store.count_profiles(Role::Admin).await.unwrap(), 1);

    assert!(matches!(
        store.ensure_profile(Uuid::new_v4()).await,
        Err(TaskStoreError::NotFound { .. })
    ));
}

pub(crate) async fn task_writes_apply_lifecycle_rules(store: &impl TaskStore) {
    let admin = account(store, "admin", Role::Admin).await;
    let worker = managed_user(store, "worker", admin).await;

    let mut pending = task("Inventory", worker, admin);
    pending.completion_report = Some("stale".to_string());
    pending.worked_hours = Some(2.0);
    let created = store.create_task(pending).await.unwrap();
    assert!(created.completion_report.is_none());
    assert!(created.worked_hours.is_none());

    let mut completing = created.clone();
    completing.status = TaskStatus::Completed;
    let err = store.update_task(completing.clone()).await.unwrap_err();
    let TaskStoreError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.contains("completionReport"));
    assert!(errors.contains("workedHours"));
    let stored = store.get_task(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Pending);

    completing.completion_report = Some("Counted every shelf".to_string());
    completing.worked_hours = Some(3.456);
    let completed = store.update_task(completing).await.unwrap();
    assert_eq!(completed.worked_hours, Some(3.46));

    let stored = store.get_task(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
    assert_eq!(stored.completion_report.as_deref(), Some("Counted every shelf"));
    assert_eq!(stored.worked_hours, Some(3.46));

    let mut reopened = stored;
    reopened.status = TaskStatus::InProgress;
    let reopened = store.update_task(reopened).await.unwrap();
    assert!(reopened.completion_report.is_none());
    let stored = store.get_task(created.id).await.unwrap().unwrap();
    assert!(stored.completion_report.is_none());
    assert!(stored.worked_hours.is_none());

    let orphan = task("Nobody", Uuid::new_v4(), admin);
    assert!(matches!(
        store.create_task(orphan).await,
        Err(TaskStoreError::ForeignKeyViolation(_))
    ));
    assert!(matches!(
        store.update_task(task("Ghost", worker, admin)).await,
        Err(TaskStoreError::NotFound { .. })
    ));
}

pub(crate) async fn update_keeps_creator(store: &impl TaskStore) {
    let admin = account(store, "creator", Role::Admin).await;
    let other = account(store, "other", Role::Admin).await;
    let worker = managed_user(store, "doer", admin).await;

    let created = store.create_task(task("Stock", worker, admin)).await.unwrap();
    let mut edited = created.clone();
    edited.created_by = other;
    edited.title = "Restock".to_string();
    let updated = store.update_task(edited).await.unwrap();

    assert_eq!(updated.created_by, admin);
    assert_eq!(updated.title, "Restock");
    assert!(updated.updated_at >= created.updated_at);
}

pub(crate) async fn task_visibility_and_ordering(store: &impl TaskStore) {
    let admin = account(store, "lead", Role::Admin).await;
    let other_admin = account(store, "lead2", Role::Admin).await;
    let superadmin = account(store, "root", Role::Superadmin).await;
    let mine = managed_user(store, "mine", admin).await;
    let theirs = managed_user(store, "theirs", other_admin).await;

    let base = Utc::now();
    let mut ids = Vec::new();
    for (offset, (title, assignee, creator)) in [
        ("managed", mine, superadmin),
        ("foreign", theirs, other_admin),
        ("own", admin, superadmin),
        ("created", theirs, admin),
    ]
    .into_iter()
    .enumerate()
    {
        let mut t = task(title, assignee, creator);
        t.created_at = base + Duration::seconds(offset as i64);
        ids.push(store.create_task(t).await.unwrap().id);
    }
    // Same creation instant as "created": the later insert comes first.
    let mut tie = task("tie", mine, admin);
    tie.created_at = base + Duration::seconds(3);
    let tie_id = store.create_task(tie).await.unwrap().id;

    let titles = |tasks: Vec<Task>| tasks.into_iter().map(|t| t.title).collect::<Vec<_>>();

    let (all, total) = store.list_tasks(TaskFilter::default()).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(all[0].id, tie_id);
    assert_eq!(titles(all), ["tie", "created", "own", "foreign", "managed"]);

    let (assigned, _) = store
        .list_tasks(TaskFilter::visible(TaskVisibility::AssignedTo(mine)))
        .await
        .unwrap();
    assert_eq!(titles(assigned), ["tie", "managed"]);

    let (managed, _) = store
        .list_tasks(TaskFilter::visible(TaskVisibility::ManagedBy(admin)))
        .await
        .unwrap();
    assert_eq!(titles(managed), ["tie", "managed"]);

    let (scope, total) = store
        .list_tasks(TaskFilter::visible(TaskVisibility::AdminScope(admin)))
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(titles(scope), ["tie", "created", "own", "managed"]);

    let (page, total) = store
        .list_tasks(TaskFilter::default().with_limit(2))
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(titles(page), ["tie", "created"]);

    let mut done = store.get_task(ids[1]).await.unwrap().unwrap();
    done.status = TaskStatus::Completed;
    done.completion_report = Some("done".to_string());
    done.worked_hours = Some(1.0);
    store.update_task(done).await.unwrap();
    let (completed, total) = store
        .list_tasks(TaskFilter::default().with_status(TaskStatus::Completed))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(titles(completed), ["foreign"]);

    let (overseen, total) = store
        .list_accounts(AccountFilter::managed_by(admin))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(overseen[0].identity.id, mine);

    let (admins, _) = store
        .list_accounts(AccountFilter::with_roles(&[Role::Admin, Role::Superadmin]))
        .await
        .unwrap();
    let names: Vec<_> = admins.iter().map(|a| a.identity.username.as_str()).collect();
    assert_eq!(names, ["lead", "lead2", "root"]);
}

pub(crate) async fn delete_identity_cascades(store: &impl TaskStore) {
    let admin = account(store, "manager", Role::Admin).await;
    let worker = managed_user(store, "worker", admin).await;
    let bystander = account(store, "bystander", Role::Superadmin).await;

    let assigned = store.create_task(task("assigned", worker, bystander)).await.unwrap();
    let created = store.create_task(task("created", bystander, admin)).await.unwrap();
    let kept = store.create_task(task("kept", bystander, bystander)).await.unwrap();

    store.delete_identity(admin).await.unwrap();

    assert!(store.get_task(created.id).await.unwrap().is_none());
    assert!(store.get_task(assigned.id).await.unwrap().is_some());
    assert!(store.get_task(kept.id).await.unwrap().is_some());
    let worker_profile = store.get_profile(worker).await.unwrap().unwrap();
    assert_eq!(worker_profile.assigned_admin, None);

    store.delete_identity(worker).await.unwrap();
    assert!(store.get_task(assigned.id).await.unwrap().is_none());
    assert!(store.get_task(kept.id).await.unwrap().is_some());
}

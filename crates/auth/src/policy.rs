//! Authorization engine.
//!
//! Every decision about who may see, create or change a task or an identity
//! is made here, by pure functions over the actor, the target task and the
//! assignee's profile. The JSON API and the panel call the same functions.

use entities::{Profile, Role, Task, TaskPatch, TaskVisibility};
use thiserror::Error;
use uuid::Uuid;

use crate::Actor;

/// Reason an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("Users cannot create tasks")]
    TaskCreateForbidden,

    #[error("You can only update your own tasks")]
    NotOwnTask,

    #[error("You can only update tasks assigned to your users")]
    NotManagedTask,

    #[error("Users can only change the status, completion report and worked hours of a task")]
    DetailsReadOnly,

    #[error("You can only view reports for your own tasks")]
    NotOwnReport,

    #[error("You can only view reports for your users")]
    NotManagedReport,

    /// The report exists only once the task is completed.
    #[error("Report is only available for completed tasks")]
    NotCompleted,

    #[error("You do not have permission to manage users and admins")]
    SuperadminOnly,
}

impl Denial {
    /// Returns true when the denial is about the actor's rights rather than
    /// the target's state.
    pub fn is_forbidden(&self) -> bool {
        !matches!(self, Self::NotCompleted)
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

impl Decision {
    fn from_check(allowed: bool, denial: Denial) -> Self {
        if allowed { Self::Allow } else { Self::Deny(denial) }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts the decision into a `Result` for use with `?`.
    pub fn into_result(self) -> Result<(), Denial> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(denial) => Err(denial),
        }
    }
}

/// Which aggregate a dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardScope {
    /// Counts across every identity and task.
    Global,
    /// Counts over the users the admin oversees.
    Managed(Uuid),
    /// Counts over the user's own tasks.
    Personal(Uuid),
}

/// Returns the filter a task listing applies for the actor.
pub fn task_visibility(actor: &Actor) -> TaskVisibility {
    match actor.role {
        Role::Superadmin => TaskVisibility::All,
        Role::Admin => TaskVisibility::AdminScope(actor.id),
        Role::User => TaskVisibility::AssignedTo(actor.id),
    }
}

/// Only admins and superadmins create tasks.
pub fn authorize_task_create(actor: &Actor) -> Decision {
    Decision::from_check(actor.role.is_admin(), Denial::TaskCreateForbidden)
}

/// Checks whether the actor may change the task at all.
///
/// `assignee` is the profile of the task's assignee; when it is missing an
/// admin may only touch tasks assigned to themselves.
pub fn authorize_task_update(actor: &Actor, task: &Task, assignee: Option<&Profile>) -> Decision {
    match actor.role {
        Role::Superadmin => Decision::Allow,
        Role::Admin => Decision::from_check(
            oversees(actor.id, task, assignee),
            Denial::NotManagedTask,
        ),
        Role::User => Decision::from_check(task.assigned_to == actor.id, Denial::NotOwnTask),
    }
}

/// Checks whether the actor may change the fields touched by `patch`
/// beyond status, report and hours.
pub fn authorize_task_detail_edit(actor: &Actor, task: &Task, patch: &TaskPatch) -> Decision {
    Decision::from_check(
        actor.role.is_admin() || !task.changes_details(patch),
        Denial::DetailsReadOnly,
    )
}

/// Checks whether the actor may read the task's completion report.
///
/// Ownership is checked before completion, so a foreign task is refused as
/// forbidden whatever its status.
pub fn authorize_task_report(actor: &Actor, task: &Task, assignee: Option<&Profile>) -> Decision {
    let owner_check = match actor.role {
        Role::Superadmin => Decision::Allow,
        Role::Admin => Decision::from_check(
            oversees(actor.id, task, assignee),
            Denial::NotManagedReport,
        ),
        Role::User => Decision::from_check(task.assigned_to == actor.id, Denial::NotOwnReport),
    };

    match owner_check {
        Decision::Allow => Decision::from_check(task.is_completed(), Denial::NotCompleted),
        deny => deny,
    }
}

/// Identity management and user-to-admin assignment are superadmin-only.
pub fn authorize_management(actor: &Actor) -> Decision {
    Decision::from_check(actor.role.is_superadmin(), Denial::SuperadminOnly)
}

/// Selects the dashboard aggregate for the actor's role.
pub fn dashboard_scope(actor: &Actor) -> DashboardScope {
    match actor.role {
        Role::Superadmin => DashboardScope::Global,
        Role::Admin => DashboardScope::Managed(actor.id),
        Role::User => DashboardScope::Personal(actor.id),
    }
}

/// Resolves the role a self-registration ends up with.
pub fn registration_role(requested: Option<Role>, allow_selection: bool) -> Role {
    match requested {
        Some(role) if allow_selection => role,
        _ => Role::User,
    }
}

/// An admin oversees tasks assigned to their users and tasks assigned to
/// themselves.
fn oversees(admin_id: Uuid, task: &Task, assignee: Option<&Profile>) -> bool {
    let managed = assignee.and_then(|profile| profile.assigned_admin) == Some(admin_id);
    managed || task.assigned_to == admin_id
}

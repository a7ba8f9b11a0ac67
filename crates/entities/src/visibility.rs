//! Row filters selecting which tasks a listing returns.

use uuid::Uuid;

use crate::Task;

/// Which tasks a listing or count includes.
///
/// `assignee_admin` in [`TaskVisibility::matches`] is the `assigned_admin`
/// of the task's assignee profile, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskVisibility {
    /// Every task.
    All,
    /// Tasks assigned to the identity.
    AssignedTo(Uuid),
    /// Tasks whose assignee is overseen by the admin.
    ManagedBy(Uuid),
    /// Union of `ManagedBy`, `AssignedTo` and tasks created by the admin.
    AdminScope(Uuid),
}

impl TaskVisibility {
    /// Evaluates the filter against a single task.
    pub fn matches(&self, task: &Task, assignee_admin: Option<Uuid>) -> bool {
        match *self {
            Self::All => true,
            Self::AssignedTo(id) => task.assigned_to == id,
            Self::ManagedBy(admin) => assignee_admin == Some(admin),
            Self::AdminScope(admin) => {
                assignee_admin == Some(admin)
                    || task.assigned_to == admin
                    || task.created_by == admin
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_admin_scope_is_a_union() {
        let admin = Uuid::new_v4();
        let worker = Uuid::new_v4();
        let other_admin = Uuid::new_v4();
        let scope = TaskVisibility::AdminScope(admin);

        let managed = Task::new("managed", worker, other_admin, Utc::now());
        assert!(scope.matches(&managed, Some(admin)));
        assert!(!scope.matches(&managed, Some(other_admin)));

        let own = Task::new("own", admin, other_admin, Utc::now());
        assert!(scope.matches(&own, None));

        let created = Task::new("created", worker, admin, Utc::now());
        assert!(scope.matches(&created, None));
    }

    #[test]
    fn test_managed_by_ignores_creator() {
        let admin = Uuid::new_v4();
        let task = Task::new("t", Uuid::new_v4(), admin, Utc::now());

        assert!(!TaskVisibility::ManagedBy(admin).matches(&task, None));
        assert!(TaskVisibility::All.matches(&task, None));
    }

    #[test]
    fn test_assigned_to() {
        let worker = Uuid::new_v4();
        let task = Task::new("t", worker, Uuid::new_v4(), Utc::now());

        assert!(TaskVisibility::AssignedTo(worker).matches(&task, None));
        assert!(!TaskVisibility::AssignedTo(Uuid::new_v4()).matches(&task, None));
    }
}

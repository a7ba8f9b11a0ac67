//! Task entity and its status lifecycle.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{REQUIRED_MESSAGE, ValidationErrors};

/// Maximum length of a task title.
pub const TITLE_MAX_LEN: usize = 200;

/// Largest accepted value for worked hours (five digits, two decimals).
pub const WORKED_HOURS_MAX: f64 = 999.99;

pub const COMPLETION_REPORT_REQUIRED: &str =
    "Completion report is required when task is marked as completed.";
pub const WORKED_HOURS_REQUIRED: &str =
    "Worked hours are required when task is marked as completed.";

/// Status of a task. Any state may follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Finished; report and hours are present.
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("\"{other}\" is not a valid choice.")),
        }
    }
}

/// An assignable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier.
    pub id: Uuid,
    /// Short title.
    pub title: String,
    /// Free-form description (may be empty).
    pub description: String,
    /// Identity doing the work.
    pub assigned_to: Uuid,
    /// Identity that created the task. Never changes after creation.
    pub created_by: Uuid,
    /// Deadline.
    pub due_date: DateTime<Utc>,
    /// Current status.
    pub status: TaskStatus,
    /// Report submitted on completion.
    pub completion_report: Option<String>,
    /// Hours spent, submitted on completion.
    pub worked_hours: Option<f64>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new pending task.
    pub fn new(
        title: impl Into<String>,
        assigned_to: Uuid,
        created_by: Uuid,
        due_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            assigned_to,
            created_by,
            due_date,
            status: TaskStatus::Pending,
            completion_report: None,
            worked_hours: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the completion report and worked hours.
    pub fn with_completion(mut self, report: impl Into<String>, hours: f64) -> Self {
        self.completion_report = Some(report.into());
        self.worked_hours = Some(hours);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Checks field constraints and the completed-only field rule.
    ///
    /// Report and hours of a non-completed task are not checked at all.
    ///
    /// Both completion errors are reported together when both are missing.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.add("title", REQUIRED_MESSAGE);
        } else if self.title.chars().count() > TITLE_MAX_LEN {
            errors.add(
                "title",
                format!("Ensure this field has no more than {TITLE_MAX_LEN} characters."),
            );
        }

        // Hours on a non-completed task are dropped by `normalize`, never checked.
        if let Some(hours) = self.worked_hours.filter(|_| self.is_completed()) {
            if !hours.is_finite() {
                errors.add("workedHours", "A valid number is required.");
            } else if hours < 0.0 {
                errors.add("workedHours", "Ensure this value is greater than or equal to 0.");
            } else if hours > WORKED_HOURS_MAX {
                errors.add(
                    "workedHours",
                    "Ensure that there are no more than 5 digits in total.",
                );
            }
        }

        if self.is_completed() {
            let has_report = self
                .completion_report
                .as_deref()
                .is_some_and(|report| !report.trim().is_empty());
            if !has_report {
                errors.add("completionReport", COMPLETION_REPORT_REQUIRED);
            }
            if self.worked_hours.is_none() {
                errors.add("workedHours", WORKED_HOURS_REQUIRED);
            }
        }

        errors.into_result()
    }

    /// Applies the completed-only data policy.
    ///
    /// Non-completed tasks never carry a report or hours; hours are kept at
    /// two decimal places.
    pub fn normalize(&mut self) {
        if self.is_completed() {
            self.worked_hours = self.worked_hours.map(|h| (h * 100.0).round() / 100.0);
        } else {
            self.completion_report = None;
            self.worked_hours = None;
        }
    }

    /// Validates and then normalizes. Every write path goes through this.
    pub fn prepare_for_save(&mut self) -> Result<(), ValidationErrors> {
        self.validate()?;
        self.normalize();
        Ok(())
    }

    /// Returns true if the patch changes anything other than status, report
    /// or hours.
    pub fn changes_details(&self, patch: &TaskPatch) -> bool {
        patch.title.as_ref().is_some_and(|t| *t != self.title)
            || patch
                .description
                .as_ref()
                .is_some_and(|d| *d != self.description)
            || patch.assigned_to.is_some_and(|a| a != self.assigned_to)
            || patch.due_date.is_some_and(|d| d != self.due_date)
    }

    /// Copies every field present in the patch onto the task.
    pub fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(report) = patch.completion_report {
            self.completion_report = Some(report);
        }
        if let Some(hours) = patch.worked_hours {
            self.worked_hours = Some(hours);
        }
    }

    /// Bumps `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub completion_report: Option<String>,
    pub worked_hours: Option<f64>,
}

impl TaskPatch {
    /// A patch touching only status, report and hours.
    pub fn progress(
        status: TaskStatus,
        completion_report: Option<String>,
        worked_hours: Option<f64>,
    ) -> Self {
        Self {
            status: Some(status),
            completion_report,
            worked_hours,
            ..Default::default()
        }
    }
}

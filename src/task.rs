//! Task data structures.
//!
//! This module defines the persisted `Task` record, the `NewTask` and
//! `TaskPatch` inputs accepted by the store, and the `TaskForm` that collects a
//! task before creation and absorbs voice drafts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::Quadrant;
use crate::parser::TaskDraft;

/// A persisted task. All instants are Unix epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub urgent: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub reminder_date: Option<i64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<i64>,
    /// Set once the reminder alert has been delivered.
    #[serde(default)]
    pub notified: bool,
    pub created_at: i64,
}

impl Task {
    /// An open task with no flags, description or reminder.
    pub fn new(id: u64, title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            urgent: false,
            important: false,
            reminder_date: None,
            completed: false,
            completed_at: None,
            notified: false,
            created_at,
        }
    }

    pub fn quadrant(&self) -> Quadrant {
        Quadrant::from_flags(self.urgent, self.important)
    }
}

/// Fields supplied when creating a task; the store assigns the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub urgent: bool,
    pub important: bool,
    pub reminder_date: Option<i64>,
}

/// Partial update. `None` leaves a field untouched; the nested options on
/// `description` and `reminder_date` allow clearing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub urgent: Option<bool>,
    pub important: Option<bool>,
    pub reminder_date: Option<Option<i64>>,
    pub notified: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Apply the present fields to `task`.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(urgent) = self.urgent {
            task.urgent = urgent;
        }
        if let Some(important) = self.important {
            task.important = important;
        }
        if let Some(reminder_date) = self.reminder_date {
            task.reminder_date = reminder_date;
        }
        if let Some(notified) = self.notified {
            task.notified = notified;
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("le titre est obligatoire")]
    EmptyTitle,
}

/// In-progress task creation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub urgent: bool,
    pub important: bool,
    pub reminder_date: Option<i64>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a voice draft into the form.
    ///
    /// Title and reminder only overwrite when the draft provides them; the
    /// urgency and importance flags always overwrite.
    pub fn merge_draft(&mut self, draft: &TaskDraft) {
        if !draft.title.is_empty() {
            self.title = draft.title.clone();
        }
        self.urgent = draft.urgent;
        self.important = draft.important;
        if draft.reminder_date.is_some() {
            self.reminder_date = draft.reminder_date;
        }
    }

    pub fn set_quadrant(&mut self, quadrant: Quadrant) {
        (self.urgent, self.important) = quadrant.flags();
    }

    pub fn quadrant(&self) -> Quadrant {
        Quadrant::from_flags(self.urgent, self.important)
    }

    /// Validate and turn the form into a creation request, leaving the form
    /// reset to its empty state.
    pub fn submit(&mut self) -> Result<NewTask, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }
        let description = self.description.trim();
        let new_task = NewTask {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            urgent: self.urgent,
            important: self.important,
            reminder_date: self.reminder_date,
        };
        *self = TaskForm::default();
        Ok(new_task)
    }
}

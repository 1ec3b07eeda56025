//! Task store and display helpers.
//!
//! This module provides the `Database` struct, a JSON-file record store with
//! create/read/update/delete operations and the equality filters used by the
//! task list, plus helpers for reminder input parsing and table output.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fields::{Filter, Quadrant};
use crate::parser::resolve_date_time;
use crate::task::{NewTask, Task, TaskPatch};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure to load or persist the task file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access task file `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("task file `{}` is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory task store backed by a JSON file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub tasks: Vec<Task>,
}

impl Database {
    /// Load the store from `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is an error so no data is silently dropped.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            debug!("event=store_load module=db status=missing path={}", path.display());
            return Ok(Database::default());
        }
        let buf = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let db: Database = serde_json::from_str(&buf).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "event=store_load module=db status=ok path={} tasks={}",
            path.display(),
            db.tasks.len()
        );
        Ok(db)
    }

    /// Save the store using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let data = serde_json::to_string_pretty(self).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data.as_bytes()).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        debug!(
            "event=store_save module=db status=ok path={} tasks={}",
            path.display(),
            self.tasks.len()
        );
        Ok(())
    }

    /// Generate the next available task ID.
    pub fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Insert a new open task stamped with `now_ms`.
    pub fn create(&mut self, new_task: NewTask, now_ms: i64) -> &Task {
        let task = Task {
            id: self.next_id(),
            title: new_task.title,
            description: new_task.description,
            urgent: new_task.urgent,
            important: new_task.important,
            reminder_date: new_task.reminder_date,
            completed: false,
            completed_at: None,
            notified: false,
            created_at: now_ms,
        };
        info!(
            "event=task_created module=db id={} quadrant={:?} reminder={}",
            task.id,
            task.quadrant(),
            task.reminder_date.is_some()
        );
        let idx = self.tasks.len();
        self.tasks.push(task);
        &self.tasks[idx]
    }

    pub fn list_all(&self) -> &[Task] {
        &self.tasks
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Apply a partial update. Returns `None` when the task does not exist.
    pub fn update(&mut self, id: u64, patch: TaskPatch) -> Option<&Task> {
        let task = self.get_mut(id)?;
        patch.apply(task);
        Some(&*task)
    }

    /// Remove a task. Returns whether anything was removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        before != self.tasks.len()
    }

    /// Set the completion state; `completed_at` follows it.
    pub fn set_completed(&mut self, id: u64, completed: bool, now_ms: i64) -> Option<&Task> {
        let task = self.get_mut(id)?;
        task.completed = completed;
        task.completed_at = completed.then_some(now_ms);
        Some(&*task)
    }

    pub fn toggle_completed(&mut self, id: u64, now_ms: i64) -> Option<&Task> {
        let completed = !self.get(id)?.completed;
        self.set_completed(id, completed, now_ms)
    }

    /// Open tasks in a quadrant.
    pub fn by_quadrant(&self, quadrant: Quadrant) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.completed && t.quadrant() == quadrant)
            .collect()
    }

    pub fn filtered(&self, filter: Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Number of tasks shown under `filter`. `All` counts open tasks only, as
    /// the filter bar does.
    pub fn count(&self, filter: Filter) -> usize {
        match filter {
            Filter::All => self.tasks.iter().filter(|t| !t.completed).count(),
            other => self.tasks.iter().filter(|t| other.matches(t)).count(),
        }
    }

    /// Open tasks whose reminder is at or before `now_ms`.
    pub fn due_reminders(&self, now_ms: i64) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.completed && t.reminder_date.is_some_and(|at| at <= now_ms))
            .collect()
    }

    /// Flag a task's reminder as delivered.
    pub fn mark_notified(&mut self, id: u64) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.notified = true;
                true
            }
            None => false,
        }
    }
}

/// Parse a reminder typed on the command line.
///
/// Supports:
/// - `YYYY-MM-DDTHH:MM` and `YYYY-MM-DD HH:MM`
/// - `YYYY-MM-DD` (09:00)
/// - any French expression the voice parser understands ("demain à 14h",
///   "vendredi prochain", "dans 20 minutes", "le 3 janvier")
pub fn parse_reminder_input<Tz: TimeZone>(s: &str, now: &DateTime<Tz>) -> Option<i64> {
    let s = s.trim();
    let tz = now.timezone();
    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(9, 0, 0))
        });
    match naive {
        Some(naive) => tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|at| at.timestamp_millis()),
        None => resolve_date_time(s, now).map(|at| at.timestamp_millis()),
    }
}

/// Format a reminder relative to now ("aujourd'hui 14:30", "demain 09:00",
/// "dans 3j", "2j de retard").
pub fn format_reminder_relative<Tz: TimeZone>(reminder: Option<i64>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(at) = reminder.and_then(|ms| localize_millis(ms, &now.timezone())) else {
        return "-".into();
    };
    let days = (at.date_naive() - now.date_naive()).num_days();
    let clock = at.format("%H:%M");
    match days {
        0 => format!("aujourd'hui {clock}"),
        1 => format!("demain {clock}"),
        d if d > 1 => format!("dans {d}j"),
        -1 => "hier".into(),
        d => format!("{}j de retard", -d),
    }
}

/// Format a reminder as a local date and time.
pub fn format_reminder(reminder: Option<i64>) -> String {
    reminder
        .and_then(|ms| localize_millis(ms, &Local))
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

fn localize_millis<Tz: TimeZone>(ms: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp_millis(ms).map(|utc| utc.with_timezone(tz))
}

/// Short quadrant code for table output.
pub fn format_quadrant(q: Quadrant) -> &'static str {
    match q {
        Quadrant::UrgentImportant => "U+I",
        Quadrant::Important => "I",
        Quadrant::Urgent => "U",
        Quadrant::Later => "-",
    }
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    println!("{:<5} {:<3} {:<4} {:<20} {}", "ID", "", "Cat", "Rappel", "Titre");
    let now = Local::now();
    for t in tasks {
        let done = if t.completed { "✓" } else { " " };
        println!(
            "{:<5} {:<3} {:<4} {:<20} {}",
            t.id,
            done,
            format_quadrant(t.quadrant()),
            truncate(&format_reminder_relative(t.reminder_date, &now), 20),
            t.title
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

//! Reminder scheduling and delivery.
//!
//! A task with a future `reminder_date` gets one pending deadline; a past-due
//! reminder fires immediately. Delivery goes through a [`Notifier`], which
//! must hold a granted [`Permission`] before anything is shown. Failures are
//! logged and never abort a sweep.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::db::Database;
use crate::task::Task;

const DEFAULT_BODY: &str = "Vous avez une tâche à faire";

/// Notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not asked yet.
    Default,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications are not permitted")]
    PermissionDenied,
    #[error("notification backend failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A user-facing alert for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Stable per task so a repeated alert replaces the previous one.
    pub tag: String,
    pub require_interaction: bool,
}

impl Notification {
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: format!("Rappel: {}", task.title),
            body: task
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BODY.to_string()),
            tag: format!("task-{}", task.id),
            require_interaction: true,
        }
    }
}

/// Delivery backend for reminders.
pub trait Notifier {
    fn permission(&self) -> Permission;

    /// Ask for permission; returns the resulting state.
    fn request_permission(&mut self) -> Permission;

    fn notify(&mut self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Ensure permission, asking at most once. Returns whether alerts may be shown.
pub fn request_permission<N: Notifier + ?Sized>(notifier: &mut N) -> bool {
    match notifier.permission() {
        Permission::Granted => true,
        Permission::Denied => {
            warn!("event=notify_permission module=reminder status=denied");
            false
        }
        Permission::Default => {
            let granted = notifier.request_permission() == Permission::Granted;
            info!("event=notify_permission module=reminder status=requested granted={granted}");
            granted
        }
    }
}

/// Show a notification if permitted. Returns whether it was delivered.
pub fn send<N: Notifier + ?Sized>(notifier: &mut N, notification: &Notification) -> bool {
    if notifier.permission() != Permission::Granted {
        warn!(
            "event=notify_skipped module=reminder tag={} reason=permission",
            notification.tag
        );
        return false;
    }
    match notifier.notify(notification) {
        Ok(()) => {
            info!("event=notify_sent module=reminder tag={}", notification.tag);
            true
        }
        Err(err) => {
            error!(
                "event=notify_failed module=reminder tag={} error={err}",
                notification.tag
            );
            false
        }
    }
}

/// What to do with one task's reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// No reminder, task completed, or past-due alert already delivered.
    Skip,
    FireNow,
    At(Duration),
}

pub fn schedule_for(task: &Task, now_ms: i64) -> Schedule {
    let Some(at) = task.reminder_date else {
        return Schedule::Skip;
    };
    if task.completed {
        return Schedule::Skip;
    }
    let delay = at.saturating_sub(now_ms);
    if delay <= 0 {
        if task.notified {
            Schedule::Skip
        } else {
            Schedule::FireNow
        }
    } else {
        Schedule::At(Duration::from_millis(delay.unsigned_abs()))
    }
}

/// Tasks whose reminder is due, still open and not yet notified.
pub fn check_reminders(tasks: &[Task], now_ms: i64) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| {
            !t.completed && !t.notified && t.reminder_date.is_some_and(|at| at <= now_ms)
        })
        .collect()
}

/// Periodic check: deliver every due reminder and mark it notified.
///
/// Returns how many tasks were notified. Tasks whose alert could not be
/// delivered stay un-notified and are retried on the next sweep.
pub fn sweep<N: Notifier + ?Sized>(db: &mut Database, notifier: &mut N, now_ms: i64) -> usize {
    let due: Vec<(u64, Notification)> = check_reminders(&db.tasks, now_ms)
        .into_iter()
        .map(|t| (t.id, Notification::for_task(t)))
        .collect();
    let mut delivered = 0;
    for (id, notification) in &due {
        if send(notifier, notification) && db.mark_notified(*id) {
            delivered += 1;
        }
    }
    delivered
}

/// One pending deadline per task, like a table of one-shot timers.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    pending: BTreeMap<u64, i64>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every pending deadline and re-plan from `tasks`. Past-due
    /// reminders fire right away; returns the ids that fired.
    pub fn reschedule_all<N: Notifier + ?Sized>(
        &mut self,
        tasks: &[Task],
        notifier: &mut N,
        now_ms: i64,
    ) -> Vec<u64> {
        self.pending.clear();
        let mut fired = Vec::new();
        for task in tasks {
            match schedule_for(task, now_ms) {
                Schedule::Skip => {}
                Schedule::FireNow => {
                    if send(notifier, &Notification::for_task(task)) {
                        fired.push(task.id);
                    }
                }
                Schedule::At(_) => {
                    if let Some(at) = task.reminder_date {
                        self.pending.insert(task.id, at);
                    }
                }
            }
        }
        fired
    }

    /// Drop every pending deadline at or before `now_ms` and fire those whose
    /// task in `tasks` is still due. A task completed, deleted, already
    /// notified or moved to a later reminder since planning stays silent.
    pub fn fire_due<N: Notifier + ?Sized>(
        &mut self,
        tasks: &[Task],
        notifier: &mut N,
        now_ms: i64,
    ) -> Vec<u64> {
        let due: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, &at)| at <= now_ms)
            .map(|(&id, _)| id)
            .collect();
        let mut fired = Vec::new();
        for id in due {
            self.pending.remove(&id);
            match tasks.iter().find(|t| t.id == id) {
                Some(task) if schedule_for(task, now_ms) == Schedule::FireNow => {
                    if send(notifier, &Notification::for_task(task)) {
                        fired.push(id);
                    }
                }
                _ => debug!("event=notify_dropped module=reminder id={id} reason=stale"),
            }
        }
        fired
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<i64> {
        self.pending.values().copied().min()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Prints alerts on standard output.
#[derive(Debug)]
pub struct TerminalNotifier {
    enabled: bool,
    permission: Permission,
}

impl TerminalNotifier {
    /// `enabled = false` makes every permission request come back denied.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            permission: Permission::Default,
        }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Permission {
        self.permission = if self.enabled {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.permission
    }

    fn notify(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        if self.permission != Permission::Granted {
            return Err(NotifyError::PermissionDenied);
        }
        let mut out = std::io::stdout().lock();
        writeln!(out, "\u{1F514} {}", notification.title)?;
        writeln!(out, "   {}", notification.body)?;
        out.flush()?;
        Ok(())
    }
}

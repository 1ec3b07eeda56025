//! Command implementations for the CLI interface.
//!
//! Each `cmd_*` handler performs one subcommand against the task store,
//! prints its outcome, and exits with status 1 on failure.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{Local, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::{debug, error, info, warn};

use crate::config::{sweep_interval, DEFAULT_SWEEP_INTERVAL_SECS};
use crate::db::*;
use crate::fields::{Filter, Quadrant};
use crate::logging::sanitize_message;
use crate::parser::{parse_task_from_speech, TaskDraft};
use crate::reminder::{request_permission, sweep, ReminderScheduler, TerminalNotifier};
use crate::speech::{capture_once, ReaderCapture};
use crate::task::{Task, TaskForm, TaskPatch};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Mark the task as urgent.
        #[arg(long)]
        urgent: bool,
        /// Mark the task as important.
        #[arg(long)]
        important: bool,
        /// Reminder: YYYY-MM-DD[ HH:MM] or a French expression ("demain à 14h").
        #[arg(long)]
        remind: Option<String>,
    },

    /// Create a task from a spoken French sentence.
    Voice {
        /// Transcript; read from stdin when omitted.
        transcript: Option<String>,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Show the inferred task without saving it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the task inferred from a transcript as JSON.
    Parse {
        transcript: String,
    },

    /// List tasks.
    List {
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
        /// Group open tasks by Eisenhower quadrant.
        #[arg(long)]
        matrix: bool,
    },

    /// View a single task.
    View {
        id: u64,
    },

    /// Update fields on a task.
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        /// New description; an empty string clears it.
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        urgent: Option<bool>,
        #[arg(long)]
        important: Option<bool>,
        /// New reminder (same formats as `add --remind`).
        #[arg(long, conflicts_with = "clear_reminder")]
        remind: Option<String>,
        #[arg(long)]
        clear_reminder: bool,
    },

    /// Mark a task as completed.
    Complete {
        id: u64,
    },

    /// Reopen a completed task.
    Reopen {
        id: u64,
    },

    /// Flip a task's completion state.
    Toggle {
        id: u64,
    },

    /// Delete a task.
    Delete {
        id: u64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Deliver due reminders.
    Remind {
        /// Keep running and deliver reminders as they come due.
        #[arg(long)]
        watch: bool,
        /// Seconds between store checks in watch mode.
        #[arg(long, default_value_t = DEFAULT_SWEEP_INTERVAL_SECS)]
        interval: u64,
        /// Do not show notifications (they are still logged as skipped).
        #[arg(long)]
        quiet: bool,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn fail(msg: impl Display) -> ! {
    error!("event=command_failed module=cmd error=\"{msg}\"");
    eprintln!("{msg}");
    std::process::exit(1);
}

fn save_or_exit(db: &Database, db_path: &Path) {
    if let Err(e) = db.save(db_path) {
        fail(format!("Failed to save DB: {e}"));
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn parse_reminder_or_exit(expr: &str) -> i64 {
    match parse_reminder_input(expr, &Local::now()) {
        Some(at) => at,
        None => fail(format!("Could not understand reminder '{expr}'.")),
    }
}

/// Create a task from explicit fields.
pub fn cmd_add(
    db: &mut Database,
    db_path: &Path,
    title: String,
    desc: Option<String>,
    urgent: bool,
    important: bool,
    remind: Option<String>,
) {
    let mut form = TaskForm {
        title,
        description: desc.unwrap_or_default(),
        urgent,
        important,
        reminder_date: remind.as_deref().map(parse_reminder_or_exit),
    };
    let new_task = form.submit().unwrap_or_else(|e| fail(e));
    let id = db.create(new_task, now_ms()).id;
    save_or_exit(db, db_path);
    info!("event=task_added module=cmd id={id} source=cli");
    println!("Added task {id}");
}

/// Capture or take a transcript, infer a task and create it.
pub fn cmd_voice(
    db: &mut Database,
    db_path: &Path,
    transcript: Option<String>,
    desc: Option<String>,
    dry_run: bool,
) {
    let transcript = match transcript {
        Some(t) => t,
        None => {
            eprintln!("Parlez... (tapez la phrase puis Entrée)");
            let mut capture = ReaderCapture::new(io::stdin().lock());
            capture_once(&mut capture).unwrap_or_else(|e| fail(e))
        }
    };
    debug!(
        "event=voice_transcript module=cmd transcript=\"{}\"",
        sanitize_message(&transcript)
    );

    let draft = parse_task_from_speech(&transcript);
    print_draft(&draft);

    let mut form = TaskForm {
        description: desc.unwrap_or_default(),
        ..TaskForm::default()
    };
    form.merge_draft(&draft);
    if dry_run {
        return;
    }

    let new_task = form.submit().unwrap_or_else(|e| fail(e));
    let id = db.create(new_task, now_ms()).id;
    save_or_exit(db, db_path);
    info!(
        "event=task_added module=cmd id={id} source=voice quadrant={:?} reminder={}",
        draft.quadrant(),
        draft.reminder_date.is_some()
    );
    println!("Added task {id}");
}

fn print_draft(draft: &TaskDraft) {
    let quadrant = draft.quadrant();
    println!("Titre:     {}", draft.title);
    println!("Catégorie: {} ({})", quadrant.label(), quadrant.hint());
    println!(
        "Rappel:    {}",
        match draft.reminder_date {
            Some(_) => format!(
                "{} ({})",
                format_reminder(draft.reminder_date),
                format_reminder_relative(draft.reminder_date, &Local::now())
            ),
            None => "-".into(),
        }
    );
}

/// Print the inferred draft as JSON.
pub fn cmd_parse(transcript: String) {
    let draft = parse_task_from_speech(&transcript);
    match serde_json::to_string_pretty(&draft) {
        Ok(json) => println!("{json}"),
        Err(e) => fail(format!("Failed to encode draft: {e}")),
    }
}

/// List tasks under a filter, or as the four-quadrant matrix.
pub fn cmd_list(db: &Database, filter: Filter, matrix: bool) {
    let bar: Vec<String> = Filter::ALL
        .iter()
        .map(|f| {
            let label = format!("{} ({})", f.label(), db.count(*f));
            if *f == filter {
                format!("[{label}]")
            } else {
                label
            }
        })
        .collect();
    println!("{}\n", bar.join("  "));

    if matrix {
        for q in Quadrant::ALL {
            let tasks = db.by_quadrant(q);
            println!("{} - {} ({})", q.label(), q.hint(), tasks.len());
            if tasks.is_empty() {
                println!("  -");
            } else {
                print_table(&tasks);
            }
            println!();
        }
        return;
    }

    let tasks = db.filtered(filter);
    if tasks.is_empty() {
        println!("Aucune tâche.");
    } else {
        print_table(&tasks);
    }
}

fn find_or_exit(db: &Database, id: u64) -> &Task {
    db.get(id).unwrap_or_else(|| fail(format!("Task {id} not found.")))
}

pub fn cmd_view(db: &Database, id: u64) {
    let task = find_or_exit(db, id);
    let quadrant = task.quadrant();
    let now = Local::now();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Quadrant:     {} ({})", quadrant.label(), quadrant.hint());
    println!("Completed:    {}", if task.completed { "yes" } else { "no" });
    println!(
        "Reminder:     {}",
        match task.reminder_date {
            Some(_) => format!(
                "{} ({}){}",
                format_reminder(task.reminder_date),
                format_reminder_relative(task.reminder_date, &now),
                if task.notified { ", notified" } else { "" }
            ),
            None => "-".into(),
        }
    );
    println!("Created:      {}", format_reminder(Some(task.created_at)));
    if task.completed_at.is_some() {
        println!("Completed at: {}", format_reminder(task.completed_at));
    }
    println!(
        "Description:\n{}\n",
        task.description.clone().unwrap_or_else(|| "-".into())
    );
}

/// Update an existing task's fields.
#[allow(clippy::too_many_arguments)]
pub fn cmd_update(
    db: &mut Database,
    db_path: &Path,
    id: u64,
    title: Option<String>,
    desc: Option<String>,
    urgent: Option<bool>,
    important: Option<bool>,
    remind: Option<String>,
    clear_reminder: bool,
) {
    find_or_exit(db, id);
    let title = title.map(|t| t.trim().to_string());
    if title.as_deref() == Some("") {
        fail("Title cannot be empty.");
    }
    let reminder_date = if clear_reminder {
        Some(None)
    } else {
        remind.as_deref().map(|expr| Some(parse_reminder_or_exit(expr)))
    };
    let patch = TaskPatch {
        title,
        description: desc.map(|d| {
            let d = d.trim();
            (!d.is_empty()).then(|| d.to_string())
        }),
        urgent,
        important,
        // A new reminder has not been delivered yet.
        notified: reminder_date.map(|_| false),
        reminder_date,
    };
    if patch.is_empty() {
        println!("Nothing to update.");
        return;
    }
    db.update(id, patch);
    save_or_exit(db, db_path);
    info!("event=task_updated module=cmd id={id}");
    println!("Updated {id}");
}

/// Set a task's completion state.
pub fn cmd_set_completed(db: &mut Database, db_path: &Path, id: u64, completed: bool) {
    if db.set_completed(id, completed, now_ms()).is_none() {
        fail(format!("Task {id} not found."));
    }
    save_or_exit(db, db_path);
    info!("event=task_completion module=cmd id={id} completed={completed}");
    println!("{} {id}", if completed { "Completed" } else { "Reopened" });
}

pub fn cmd_toggle(db: &mut Database, db_path: &Path, id: u64) {
    let Some(completed) = db.toggle_completed(id, now_ms()).map(|t| t.completed) else {
        fail(format!("Task {id} not found."));
    };
    save_or_exit(db, db_path);
    info!("event=task_completion module=cmd id={id} completed={completed}");
    println!("{} {id}", if completed { "Completed" } else { "Reopened" });
}

/// Delete a task after confirmation.
pub fn cmd_delete(db: &mut Database, db_path: &Path, id: u64, yes: bool) {
    let title = find_or_exit(db, id).title.clone();
    if !yes {
        print!("Supprimer la tâche {id} « {title} » ? (y/N): ");
        if io::stdout().flush().is_err() {
            fail("Failed to write prompt.");
        }
        let mut response = String::new();
        if io::stdin().read_line(&mut response).is_err()
            || !response.trim().to_lowercase().starts_with('y')
        {
            println!("Deletion cancelled.");
            return;
        }
    }
    db.delete(id);
    save_or_exit(db, db_path);
    info!("event=task_deleted module=cmd id={id}");
    println!("Deleted {id}");
}

/// Deliver due reminders once, or keep watching the store.
pub fn cmd_remind(db_path: &Path, watch: bool, interval: u64, quiet: bool) {
    let interval = sweep_interval(interval).unwrap_or_else(|e| fail(e));
    let mut notifier = TerminalNotifier::new(!quiet);
    if !request_permission(&mut notifier) {
        eprintln!("Notifications are disabled; reminders will not be shown.");
    }

    let mut db = load_or_exit(db_path);
    let overdue = db.due_reminders(now_ms()).len();
    let delivered = sweep(&mut db, &mut notifier, now_ms());
    if delivered > 0 {
        save_or_exit(&db, db_path);
    }
    if !watch {
        println!("{delivered} reminder(s) delivered, {overdue} due.");
        return;
    }

    info!(
        "event=remind_watch module=cmd status=start interval_secs={}",
        interval.as_secs()
    );
    let mut scheduler = ReminderScheduler::new();
    loop {
        let now = now_ms();
        let fired = scheduler.reschedule_all(&db.tasks, &mut notifier, now);
        mark_notified(&mut db, &fired);
        if !fired.is_empty() {
            save_or_exit(&db, db_path);
        }

        let wait = scheduler
            .next_deadline()
            .map(|at| Duration::from_millis(at.saturating_sub(now).max(0).unsigned_abs()))
            .map_or(interval, |until| until.min(interval));
        debug!(
            "event=remind_sleep module=cmd pending={} wait_ms={}",
            scheduler.pending_len(),
            wait.as_millis()
        );
        std::thread::sleep(wait);

        // Other commands may have completed, deleted or rescheduled tasks
        // while we slept; fire against the store as it is now.
        db = load_or_exit(db_path);
        let now = now_ms();
        let fired = scheduler.fire_due(&db.tasks, &mut notifier, now);
        mark_notified(&mut db, &fired);
        let delivered = fired.len() + sweep(&mut db, &mut notifier, now);
        if delivered > 0 {
            save_or_exit(&db, db_path);
        }
    }
}

fn load_or_exit(db_path: &Path) -> Database {
    Database::load(db_path).unwrap_or_else(|e| fail(e))
}

fn mark_notified(db: &mut Database, ids: &[u64]) {
    for id in ids {
        if !db.mark_notified(*id) {
            warn!("event=notify_mark_missing module=cmd id={id}");
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

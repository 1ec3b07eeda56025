//! # todo - Eisenhower task manager with French voice capture
//!
//! Tasks are sorted into the four quadrants of the Eisenhower matrix by two
//! flags, `urgent` and `important`. A task can be typed in field by field, or
//! dictated as one French sentence that is turned into a draft:
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use eisen_todo::parser::parse_task_at;
//!
//! let now = FixedOffset::east_opt(3600).unwrap()
//!     .with_ymd_and_hms(2026, 11, 4, 10, 15, 0).unwrap();
//! let draft = parse_task_at("Rappelle-moi d'appeler le dentiste demain à 14h30, c'est urgent", &now);
//! assert_eq!(draft.title, "Appeler le dentiste");
//! assert!(draft.urgent && !draft.important);
//! assert!(draft.reminder_date.is_some());
//! ```
//!
//! ## Modules
//!
//! - [`parser`]: keyword classification, French date/time resolution and
//!   title extraction. Pure and total.
//! - [`task`], [`fields`]: the persisted record, the creation form and the
//!   quadrant/filter enums.
//! - [`db`]: the JSON-file store and table output helpers.
//! - [`reminder`]: reminder scheduling and notification delivery.
//! - [`speech`]: single-utterance capture sessions.
//! - [`config`], [`logging`]: runtime configuration and the file logger.
//!
//! Data is stored locally in `~/.todo/` (or `$TODO_HOME`).

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod fields;
pub mod logging;
pub mod parser;
pub mod reminder;
pub mod speech;
pub mod task;

pub use fields::{Filter, Quadrant};
pub use parser::{parse_task_at, parse_task_from_speech, TaskDraft};
pub use task::{NewTask, Task, TaskForm, TaskPatch};

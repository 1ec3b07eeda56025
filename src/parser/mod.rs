//! Voice-to-task inference.
//!
//! Turns one finalized French transcript into a [`TaskDraft`]: a title, the two
//! Eisenhower flags and an optional reminder instant. Every function here is
//! total and free of side effects; unrecognized speech degrades to defaults
//! (no flags, no reminder, placeholder title) instead of failing.

pub mod keywords;
pub mod temporal;
pub mod title;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::fields::Quadrant;

pub use keywords::{classify, Classification};
pub use temporal::{resolve_date_time, TemporalExpr};
pub use title::{extract_title, DEFAULT_TITLE};

/// Structured result of parsing one transcript. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub urgent: bool,
    pub important: bool,
    /// Unix epoch milliseconds.
    pub reminder_date: Option<i64>,
    pub original_transcript: String,
}

impl TaskDraft {
    /// Eisenhower quadrant implied by the two flags.
    pub fn quadrant(&self) -> Quadrant {
        Quadrant::from_flags(self.urgent, self.important)
    }
}

/// Parse a transcript against the current local time.
pub fn parse_task_from_speech(transcript: &str) -> TaskDraft {
    parse_task_at(transcript, &Local::now())
}

/// Parse a transcript against a caller-supplied reference instant.
///
/// `now` is read once and shared by every sub-resolution.
pub fn parse_task_at<Tz: TimeZone>(transcript: &str, now: &DateTime<Tz>) -> TaskDraft {
    let Classification { urgent, important } = classify(transcript);
    TaskDraft {
        title: extract_title(transcript),
        urgent,
        important,
        reminder_date: resolve_date_time(transcript, now).map(|at| at.timestamp_millis()),
        original_transcript: transcript.to_string(),
    }
}

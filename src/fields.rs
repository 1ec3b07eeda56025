//! Enumerations used to categorise and filter tasks.
//!
//! A task carries two independent booleans (`urgent`, `important`); the
//! Eisenhower quadrant and the list filters are derived from them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Eisenhower matrix quadrant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    UrgentImportant,
    Important,
    Urgent,
    Later,
}

impl Quadrant {
    /// All quadrants in display order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UrgentImportant,
        Quadrant::Important,
        Quadrant::Urgent,
        Quadrant::Later,
    ];

    pub fn from_flags(urgent: bool, important: bool) -> Self {
        match (urgent, important) {
            (true, true) => Quadrant::UrgentImportant,
            (false, true) => Quadrant::Important,
            (true, false) => Quadrant::Urgent,
            (false, false) => Quadrant::Later,
        }
    }

    /// `(urgent, important)` for this quadrant.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Quadrant::UrgentImportant => (true, true),
            Quadrant::Important => (false, true),
            Quadrant::Urgent => (true, false),
            Quadrant::Later => (false, false),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "Urgent & Important",
            Quadrant::Important => "Important",
            Quadrant::Urgent => "Urgent",
            Quadrant::Later => "À planifier",
        }
    }

    /// What to do with tasks in this quadrant.
    pub fn hint(self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "À faire immédiatement",
            Quadrant::Important => "À planifier",
            Quadrant::Urgent => "À déléguer si possible",
            Quadrant::Later => "Quand vous avez du temps",
        }
    }
}

/// Task list filters, mirroring the filter bar.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    UrgentImportant,
    Important,
    Urgent,
    Later,
    Completed,
}

impl Filter {
    /// All filters in filter-bar order.
    pub const ALL: [Filter; 6] = [
        Filter::All,
        Filter::UrgentImportant,
        Filter::Important,
        Filter::Urgent,
        Filter::Later,
        Filter::Completed,
    ];

    /// Quadrant filters only match open tasks; `All` matches everything.
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => task.completed,
            quadrant => {
                !task.completed && Some(task.quadrant()) == quadrant.quadrant()
            }
        }
    }

    pub fn quadrant(self) -> Option<Quadrant> {
        match self {
            Filter::UrgentImportant => Some(Quadrant::UrgentImportant),
            Filter::Important => Some(Quadrant::Important),
            Filter::Urgent => Some(Quadrant::Urgent),
            Filter::Later => Some(Quadrant::Later),
            Filter::All | Filter::Completed => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "Toutes",
            Filter::Completed => "Terminées",
            other => other.quadrant().map(Quadrant::label).unwrap_or("-"),
        }
    }
}

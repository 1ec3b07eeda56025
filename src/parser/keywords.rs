//! Urgency and importance vocabulary.
//!
//! Detection is plain substring containment over the lower-cased transcript,
//! so a keyword embedded in a longer word still counts.

use serde::{Deserialize, Serialize};

/// Words and idioms that flag a task as urgent.
pub const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "urgente",
    "immédiatement",
    "tout de suite",
    "maintenant",
    "rapidement",
    "vite",
    "au plus vite",
    "dès que possible",
    "asap",
    "urgemment",
    "urgence",
    "en urgence",
    "en priorité",
];

/// Words that flag a task as important.
pub const IMPORTANT_KEYWORDS: &[&str] = &[
    "important",
    "importante",
    "crucial",
    "cruciale",
    "prioritaire",
    "essentiel",
    "essentielle",
    "capital",
    "capitale",
    "primordial",
];

/// The two Eisenhower axes detected in a transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub urgent: bool,
    pub important: bool,
}

/// Classify a transcript along both axes independently.
pub fn classify(text: &str) -> Classification {
    let lower = text.to_lowercase();
    Classification {
        urgent: contains_any(&lower, URGENT_KEYWORDS),
        important: contains_any(&lower, IMPORTANT_KEYWORDS),
    }
}

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| lower.contains(keyword))
}

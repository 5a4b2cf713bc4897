//! Document, topic and note records.
//!
//! # Responsibility
//! - Provide the serde shape of the snapshot (`topics[] -> notes[]`).
//! - Offer linear lookup helpers used by repository transactions.
//! - Enforce the "no empty topic" invariant in one place.
//!
//! # Invariants
//! - `Document::enforce_invariants()` runs at the end of every mutation.
//! - Duplicate note names are allowed; name lookups resolve to the first
//!   match in creation order.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp layout used for every note: `month/day/year - hour:minute:second`.
pub const NOTE_TIMESTAMP_FORMAT: &str = "%m/%d/%y - %H:%M:%S";

/// Root container persisted as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Topics in first-created-first order.
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// Named grouping of notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique key within the document.
    pub name: String,
    /// Notes in creation order.
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// One named, timestamped text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub name: String,
    /// May be empty.
    #[serde(default)]
    pub text: String,
    /// Local time formatted with [`NOTE_TIMESTAMP_FORMAT`].
    pub timestamp: String,
}

/// Name/body pair for a note that has not been timestamped yet.
///
/// Drafts are stamped inside the store critical section, so every note of a
/// batch shares the moment it actually landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub name: String,
    pub text: String,
}

impl NoteDraft {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Captures the current local time and turns the draft into a note.
    pub fn stamp(self) -> Note {
        Note::at(self.name, self.text, Local::now())
    }
}

impl Note {
    /// Creates a note stamped with the current local time.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::at(name, text, Local::now())
    }

    /// Creates a note stamped with a caller-provided instant.
    pub fn at(name: impl Into<String>, text: impl Into<String>, instant: DateTime<Local>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            timestamp: instant.format(NOTE_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: Vec::new(),
        }
    }

    /// Index of the first note whose name matches exactly.
    pub fn position_of_note(&self, name: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.name == name)
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.name == name)
    }

    pub fn topic_mut(&mut self, name: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|topic| topic.name == name)
    }

    /// Returns the named topic, appending a fresh one when it does not exist.
    pub fn topic_or_insert(&mut self, name: &str) -> &mut Topic {
        let index = match self.topics.iter().position(|topic| topic.name == name) {
            Some(index) => index,
            None => {
                self.topics.push(Topic::new(name));
                self.topics.len() - 1
            }
        };
        &mut self.topics[index]
    }

    /// Removes the named topic and returns it.
    pub fn remove_topic(&mut self, name: &str) -> Option<Topic> {
        let index = self.topics.iter().position(|topic| topic.name == name)?;
        Some(self.topics.remove(index))
    }

    /// Total number of notes across all topics.
    pub fn note_count(&self) -> usize {
        self.topics.iter().map(|topic| topic.notes.len()).sum()
    }

    /// Drops topics that no longer hold any note.
    ///
    /// Returns how many topics were removed.
    pub fn enforce_invariants(&mut self) -> usize {
        let before = self.topics.len();
        self.topics.retain(|topic| !topic.notes.is_empty());
        before - self.topics.len()
    }
}

//! Note repository contracts and snapshot implementation.
//!
//! # Responsibility
//! - Provide topic-scoped note APIs on top of `DocumentStore`.
//! - Own the "first match wins" rule for duplicate note names.
//!
//! # Invariants
//! - Topics are created by the first add and removed with their last note.
//! - `add_notes` lands the whole batch in one critical section and one persist.
//! - A missing snapshot is `StoreNotFound` for `list_notes`, `list_topics`
//!   and `delete_topic`; every other path treats it as an empty document.

use crate::model::document::{Note, NoteDraft};
use crate::store::{DocumentStore, SnapshotPolicy, StoreError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note operations.
#[derive(Debug)]
pub enum RepoError {
    /// No snapshot exists for an operation that requires one.
    StoreNotFound,
    TopicNotFound(String),
    NoteNotFound { topic: String, name: String },
    /// Snapshot could not be read or written.
    Store(StoreError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreNotFound => write!(f, "database not found"),
            Self::TopicNotFound(topic) => write!(f, "topic \"{topic}\" not found"),
            Self::NoteNotFound { topic, name } => {
                write!(f, "note \"{name}\" not found under topic \"{topic}\"")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(_) => Self::StoreNotFound,
            other => Self::Store(other),
        }
    }
}

/// Read model for topic overviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub name: String,
    pub note_count: usize,
}

/// Repository interface for topic/note operations.
pub trait NoteRepository {
    /// Appends one note, creating the topic when needed.
    fn add_note(&self, topic: &str, draft: NoteDraft) -> RepoResult<Note>;
    /// Appends every draft under `topic` as one atomic unit.
    fn add_notes(&self, topic: &str, drafts: Vec<NoteDraft>) -> RepoResult<Vec<Note>>;
    /// Lists notes of one topic in creation order.
    fn list_notes(&self, topic: &str) -> RepoResult<Vec<Note>>;
    /// Removes the first note named `name` under `topic`.
    fn delete_note(&self, topic: &str, name: &str) -> RepoResult<Note>;
    /// Removes a topic and all of its notes; returns how many notes went with it.
    fn delete_topic(&self, topic: &str) -> RepoResult<usize>;
    /// Lists every topic with its note count.
    fn list_topics(&self) -> RepoResult<Vec<TopicSummary>>;
}

/// Snapshot-backed note repository.
#[derive(Debug, Clone)]
pub struct SnapshotNoteRepository {
    store: Arc<DocumentStore>,
}

impl SnapshotNoteRepository {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }
}

impl NoteRepository for SnapshotNoteRepository {
    fn add_note(&self, topic: &str, draft: NoteDraft) -> RepoResult<Note> {
        self.store.write(SnapshotPolicy::CreateIfMissing, |document| {
            let note = draft.stamp();
            document.topic_or_insert(topic).notes.push(note.clone());
            Ok(note)
        })
    }

    fn add_notes(&self, topic: &str, drafts: Vec<NoteDraft>) -> RepoResult<Vec<Note>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        self.store.write(SnapshotPolicy::CreateIfMissing, |document| {
            let target = document.topic_or_insert(topic);
            let mut added = Vec::with_capacity(drafts.len());
            for draft in drafts {
                let note = draft.stamp();
                target.notes.push(note.clone());
                added.push(note);
            }
            Ok(added)
        })
    }

    fn list_notes(&self, topic: &str) -> RepoResult<Vec<Note>> {
        self.store.read(|document| {
            document
                .topic(topic)
                .map(|found| found.notes.clone())
                .ok_or_else(|| RepoError::TopicNotFound(topic.to_string()))
        })
    }

    fn delete_note(&self, topic: &str, name: &str) -> RepoResult<Note> {
        self.store.write(SnapshotPolicy::CreateIfMissing, |document| {
            let target = document
                .topic_mut(topic)
                .ok_or_else(|| RepoError::TopicNotFound(topic.to_string()))?;
            let index = target
                .position_of_note(name)
                .ok_or_else(|| RepoError::NoteNotFound {
                    topic: topic.to_string(),
                    name: name.to_string(),
                })?;
            // An emptied topic is pruned by the store before persist.
            Ok(target.notes.remove(index))
        })
    }

    fn delete_topic(&self, topic: &str) -> RepoResult<usize> {
        self.store.write(SnapshotPolicy::RequireExisting, |document| {
            document
                .remove_topic(topic)
                .map(|removed| removed.notes.len())
                .ok_or_else(|| RepoError::TopicNotFound(topic.to_string()))
        })
    }

    fn list_topics(&self) -> RepoResult<Vec<TopicSummary>> {
        self.store.read(|document| {
            Ok(document
                .topics
                .iter()
                .map(|topic| TopicSummary {
                    name: topic.name.clone(),
                    note_count: topic.notes.len(),
                })
                .collect())
        })
    }
}

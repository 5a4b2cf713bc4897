//! Note use-case service.
//!
//! # Responsibility
//! - Provide add/list/delete entry points for boundary callers.
//! - Reject blank topic names before any store access.
//! - Emit metadata-only operation events.
//!
//! # Invariants
//! - Topic and note names are matched exactly; no trimming or case folding.
//! - Note bodies never appear in logs; only lengths and counts do.

use crate::model::document::{Note, NoteDraft};
use crate::repo::note_repo::{NoteRepository, RepoError, TopicSummary};
use crate::store::StoreError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Caller input violates a model invariant.
    InvalidInput(&'static str),
    /// Repository failure, including semantic not-found cases.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(details) => write!(f, "invalid input: {details}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds one note, creating its topic on first use.
    pub fn add_note(
        &self,
        topic: &str,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<Note, NoteServiceError> {
        ensure_topic(topic)?;
        let draft = NoteDraft::new(name, text);
        let text_len = draft.text.chars().count();
        let result = self.repo.add_note(topic, draft);
        log_outcome("note_add", &result, || format!("text_len={text_len}"));
        Ok(result?)
    }

    /// Lists every note under `topic` in creation order.
    pub fn list_notes(&self, topic: &str) -> Result<Vec<Note>, NoteServiceError> {
        ensure_topic(topic)?;
        let result = self.repo.list_notes(topic);
        log_outcome("note_list", &result, || match &result {
            Ok(notes) => format!("notes={}", notes.len()),
            Err(_) => String::new(),
        });
        Ok(result?)
    }

    /// Deletes the first note named `name` under `topic`.
    pub fn delete_note(&self, topic: &str, name: &str) -> Result<Note, NoteServiceError> {
        ensure_topic(topic)?;
        let result = self.repo.delete_note(topic, name);
        log_outcome("note_delete", &result, String::new);
        Ok(result?)
    }

    /// Deletes a topic together with all of its notes.
    pub fn delete_topic(&self, topic: &str) -> Result<usize, NoteServiceError> {
        ensure_topic(topic)?;
        let result = self.repo.delete_topic(topic);
        log_outcome("topic_delete", &result, || match &result {
            Ok(removed) => format!("notes_removed={removed}"),
            Err(_) => String::new(),
        });
        Ok(result?)
    }

    /// Lists all topics with their note counts.
    pub fn list_topics(&self) -> Result<Vec<TopicSummary>, NoteServiceError> {
        let result = self.repo.list_topics();
        log_outcome("topic_list", &result, || match &result {
            Ok(topics) => format!("topics={}", topics.len()),
            Err(_) => String::new(),
        });
        Ok(result?)
    }
}

pub(crate) fn ensure_topic(topic: &str) -> Result<(), NoteServiceError> {
    if topic.trim().is_empty() {
        return Err(NoteServiceError::InvalidInput("topic must not be blank"));
    }
    Ok(())
}

fn log_outcome<T>(event: &str, result: &Result<T, RepoError>, details: impl FnOnce() -> String) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok {}", details()),
        Err(err @ RepoError::Store(_)) => warn!(
            "event={event} module=service status=error error_code={} error={err}",
            repo_error_code(err)
        ),
        Err(err) => info!(
            "event={event} module=service status=rejected error_code={}",
            repo_error_code(err)
        ),
    }
}

/// Stable machine-readable code for a repository error.
pub fn repo_error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::StoreNotFound => "store_not_found",
        RepoError::TopicNotFound(_) => "topic_not_found",
        RepoError::NoteNotFound { .. } => "note_not_found",
        RepoError::Store(StoreError::ReadFailure { .. }) => "read_failure",
        RepoError::Store(_) => "write_failure",
    }
}

//! Core domain logic for the notebook service.
//! This crate is the single source of truth for document invariants and
//! for the critical section that guards the shared snapshot.

pub mod logging;
pub mod lookup;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{
    default_log_level, init_logging, logging_status, normalize_level, normalize_log_dir,
    LogSettings,
};
pub use lookup::{LookupError, ResultId, SearchLookup, WikipediaLookup};
pub use model::document::{Document, Note, NoteDraft, Topic, NOTE_TIMESTAMP_FORMAT};
pub use repo::note_repo::{
    NoteRepository, RepoError, RepoResult, SnapshotNoteRepository, TopicSummary,
};
pub use service::enrichment::{EnrichmentError, LinkEnrichmentService, MAX_LINKS_PER_LOOKUP};
pub use service::note_service::{repo_error_code, NoteService, NoteServiceError};
pub use store::{DocumentStore, SnapshotPolicy, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Search-link enrichment for topics.
//!
//! # Responsibility
//! - Resolve a search term through the injected lookup collaborator.
//! - Turn the top ranked results into synthetic link notes.
//! - Commit those notes as one batch through the note repository.
//!
//! # Invariants
//! - At most `MAX_LINKS_PER_LOOKUP` notes per call; never padded.
//! - Zero results commit nothing.
//! - The network call runs outside the store critical section; the batch
//!   commit runs inside exactly one.

use crate::lookup::{LookupError, SearchLookup};
use crate::model::document::NoteDraft;
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::service::note_service::{ensure_topic, repo_error_code, NoteServiceError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub const MAX_LINKS_PER_LOOKUP: usize = 3;

/// Enrichment failure.
#[derive(Debug)]
pub enum EnrichmentError {
    InvalidInput(&'static str),
    /// Lookup collaborator could not be reached or answered badly.
    LookupUnavailable(LookupError),
    /// Lookup succeeded but found nothing for the term.
    NoResults(String),
    /// Committing the synthetic notes failed.
    Repo(RepoError),
}

impl Display for EnrichmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(details) => write!(f, "invalid input: {details}"),
            Self::LookupUnavailable(err) => write!(f, "{err}"),
            Self::NoResults(term) => write!(f, "no results found for \"{term}\""),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EnrichmentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LookupUnavailable(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InvalidInput(_) | Self::NoResults(_) => None,
        }
    }
}

impl From<NoteServiceError> for EnrichmentError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::InvalidInput(details) => Self::InvalidInput(details),
            NoteServiceError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Appends lookup-derived link notes to topics.
pub struct LinkEnrichmentService<R: NoteRepository> {
    repo: R,
    lookup: Arc<dyn SearchLookup>,
}

impl<R: NoteRepository> LinkEnrichmentService<R> {
    pub fn new(repo: R, lookup: Arc<dyn SearchLookup>) -> Self {
        Self { repo, lookup }
    }

    /// Looks up `search_term` and appends up to three ranked link notes to `topic`.
    ///
    /// Returns the committed links in rank order.
    ///
    /// # Errors
    /// - `LookupUnavailable` on any collaborator failure.
    /// - `NoResults` when the collaborator returns nothing.
    /// - `Repo` when the batch cannot be persisted.
    pub fn append_search_links(
        &self,
        topic: &str,
        search_term: &str,
    ) -> Result<Vec<String>, EnrichmentError> {
        ensure_topic(topic)?;

        let ids = self.lookup.resolve(search_term).map_err(|err| {
            warn!("event=link_enrich module=service status=error error_code=lookup_unavailable");
            EnrichmentError::LookupUnavailable(err)
        })?;
        if ids.is_empty() {
            info!("event=link_enrich module=service status=rejected error_code=no_results");
            return Err(EnrichmentError::NoResults(search_term.to_string()));
        }

        let label = self.lookup.source_label();
        let (links, drafts): (Vec<String>, Vec<NoteDraft>) = ids
            .into_iter()
            .take(MAX_LINKS_PER_LOOKUP)
            .enumerate()
            .map(|(index, id)| {
                let link = self.lookup.link_for(id);
                let name = format!("{label} Link {} for {search_term}", index + 1);
                (link.clone(), NoteDraft::new(name, link))
            })
            .unzip();

        let added = self.repo.add_notes(topic, drafts).map_err(|err| {
            warn!(
                "event=link_enrich module=service status=error error_code={} error={err}",
                repo_error_code(&err)
            );
            EnrichmentError::Repo(err)
        })?;
        info!(
            "event=link_enrich module=service status=ok links={}",
            added.len()
        );
        Ok(links)
    }
}

//! External search lookup capability.
//!
//! # Responsibility
//! - Define the "resolve term to ranked result ids" seam used by enrichment.
//! - Host the Wikipedia-backed adapter.
//!
//! # Invariants
//! - Implementations return results in rank order.
//! - Every call is bounded by a finite timeout; expiry is a `LookupError`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod wikipedia;

pub use wikipedia::{WikipediaLookup, DEFAULT_LOOKUP_TIMEOUT, WIKIPEDIA_API_ENDPOINT};

/// Opaque ranked result identifier (a page id for Wikipedia).
pub type ResultId = u64;

/// Lookup collaborator contract.
pub trait SearchLookup: Send + Sync {
    /// Resolves `term` to ranked result ids; an empty vec is a valid outcome.
    fn resolve(&self, term: &str) -> Result<Vec<ResultId>, LookupError>;
    /// Builds the public link for one result id.
    fn link_for(&self, id: ResultId) -> String;
    /// Human-readable source name used when naming synthetic notes.
    fn source_label(&self) -> &str;
}

/// Transport-level lookup failure.
#[derive(Debug)]
pub enum LookupError {
    /// Client could not be constructed.
    Client(String),
    /// Request failed to complete (connect, timeout, body read).
    Transport(String),
    /// Collaborator answered with a non-success status.
    Status(u16),
    /// Collaborator answered with a body we could not decode.
    Decode(String),
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(details) => write!(f, "lookup client unavailable: {details}"),
            Self::Transport(details) => write!(f, "lookup request failed: {details}"),
            Self::Status(code) => write!(f, "lookup service responded with HTTP {code}"),
            Self::Decode(details) => write!(f, "lookup response could not be decoded: {details}"),
        }
    }
}

impl Error for LookupError {}

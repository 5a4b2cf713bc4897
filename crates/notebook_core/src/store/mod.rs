//! Snapshot-backed document storage.
//!
//! # Responsibility
//! - Load and atomically persist the single document snapshot.
//! - Provide the one critical section every repository operation runs in.
//!
//! # Invariants
//! - Load and persist never interleave: both happen under the store mutex.
//! - A persisted snapshot never contains an empty topic.
//! - Missing/corrupt snapshots heal to an empty document on write paths.
//! - A snapshot that exists but cannot be read is never overwritten.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod snapshot;

pub use snapshot::{DocumentStore, SnapshotPolicy};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// No snapshot exists where one was required.
    NotFound(PathBuf),
    /// The snapshot exists but could not be read; nothing was written.
    ReadFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The snapshot could not be written; the mutation is not committed.
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "snapshot not found at `{}`", path.display()),
            Self::ReadFailure { path, source } => write!(
                f,
                "failed to read snapshot `{}`: {source}",
                path.display()
            ),
            Self::WriteFailure { path, source } => write!(
                f,
                "failed to write snapshot `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::ReadFailure { source, .. } | Self::WriteFailure { source, .. } => Some(source),
        }
    }
}

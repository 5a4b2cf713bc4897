//! Document store over a JSON snapshot file.
//!
//! # Responsibility
//! - Reload the snapshot at the start of every unit of work.
//! - Persist via temp file + rename so readers never see a partial write.
//! - Serialize every read and write through one process-wide mutex.
//!
//! # Invariants
//! - `read`/`write` hold the mutex across load, closure and persist.
//! - A closure error skips persist; nothing is committed.
//! - Empty topics are pruned before every persist.
//! - Only a missing or unparsable snapshot heals to empty; an I/O failure
//!   while reading aborts the unit of work before anything is persisted.

use super::{StoreError, StoreResult};
use crate::model::document::Document;
use log::{debug, error, warn};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tempfile::NamedTempFile;

/// How a write transaction treats a missing snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPolicy {
    /// Start from an empty document.
    CreateIfMissing,
    /// Fail with `StoreError::NotFound`.
    RequireExisting,
}

enum SnapshotState {
    Missing,
    Corrupt,
    Failed(std::io::Error),
    Loaded(Document),
}

/// Owned, injectable store for the single shared document.
///
/// Share it as `Arc<DocumentStore>`; the mutex inside is the only
/// serialization point for document access. The mutex is not reentrant:
/// `load`/`load_existing`/`persist` must not be called from inside a
/// `read` or `write` closure.
#[derive(Debug)]
pub struct DocumentStore {
    snapshot_path: PathBuf,
    gate: Mutex<()>,
}

impl DocumentStore {
    /// Binds a store to `snapshot_path`. The file is not touched until first use.
    pub fn open(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            gate: Mutex::new(()),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Reads the current snapshot, healing missing or corrupt files to empty.
    ///
    /// # Errors
    /// - `StoreError::ReadFailure` when the file exists but cannot be read.
    pub fn load(&self) -> StoreResult<Document> {
        let _guard = self.enter();
        self.load_healing()
    }

    /// Reads the current snapshot; a missing file is `StoreError::NotFound`.
    ///
    /// A snapshot that exists but cannot be parsed still reads as empty;
    /// one that cannot be read at all is `StoreError::ReadFailure`.
    pub fn load_existing(&self) -> StoreResult<Document> {
        let _guard = self.enter();
        self.load_required()
    }

    /// Atomically replaces the snapshot with `document`.
    pub fn persist(&self, document: &Document) -> StoreResult<()> {
        let _guard = self.enter();
        self.persist_locked(document)
    }

    /// Runs a read-only unit of work against a freshly loaded snapshot.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when no snapshot exists.
    /// - `StoreError::ReadFailure` when the snapshot cannot be read.
    /// - Any error returned by `f`.
    pub fn read<T, E>(&self, f: impl FnOnce(&Document) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.enter();
        let document = self.load_required()?;
        f(&document)
    }

    /// Runs a mutating unit of work: reload, mutate, prune, persist.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when `policy` requires an existing snapshot.
    /// - `StoreError::ReadFailure` when the snapshot exists but cannot be
    ///   read; the snapshot is left untouched.
    /// - Any error returned by `f` (nothing is persisted).
    /// - `StoreError::WriteFailure` when the snapshot cannot be written.
    pub fn write<T, E>(
        &self,
        policy: SnapshotPolicy,
        f: impl FnOnce(&mut Document) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.enter();
        let mut document = match policy {
            SnapshotPolicy::CreateIfMissing => self.load_healing()?,
            SnapshotPolicy::RequireExisting => self.load_required()?,
        };

        let output = f(&mut document)?;

        let pruned = document.enforce_invariants();
        if pruned > 0 {
            debug!("event=topic_prune module=store status=ok pruned={pruned}");
        }
        self.persist_locked(&document)?;
        Ok(output)
    }

    fn enter(&self) -> MutexGuard<'_, ()> {
        // The guarded state lives on disk, so a panic mid-section leaves
        // nothing half-updated in memory.
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_healing(&self) -> StoreResult<Document> {
        match self.read_snapshot() {
            SnapshotState::Loaded(document) => Ok(document),
            SnapshotState::Missing | SnapshotState::Corrupt => Ok(Document::new()),
            SnapshotState::Failed(source) => Err(self.read_failure(source)),
        }
    }

    fn load_required(&self) -> StoreResult<Document> {
        match self.read_snapshot() {
            SnapshotState::Loaded(document) => Ok(document),
            SnapshotState::Corrupt => Ok(Document::new()),
            SnapshotState::Missing => Err(StoreError::NotFound(self.snapshot_path.clone())),
            SnapshotState::Failed(source) => Err(self.read_failure(source)),
        }
    }

    fn read_failure(&self, source: std::io::Error) -> StoreError {
        StoreError::ReadFailure {
            path: self.snapshot_path.clone(),
            source,
        }
    }

    fn read_snapshot(&self) -> SnapshotState {
        let started_at = Instant::now();
        let raw = match std::fs::read(&self.snapshot_path) {
            Ok(raw) => raw,
            // A file where a parent directory should be also means no snapshot.
            Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                debug!("event=snapshot_load module=store status=missing");
                return SnapshotState::Missing;
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=store status=error error_code=read_failure error={err}"
                );
                return SnapshotState::Failed(err);
            }
        };

        match serde_json::from_slice::<Document>(&raw) {
            Ok(document) => {
                debug!(
                    "event=snapshot_load module=store status=ok topics={} notes={} duration_ms={}",
                    document.topics.len(),
                    document.note_count(),
                    started_at.elapsed().as_millis()
                );
                SnapshotState::Loaded(document)
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=store status=error error_code=snapshot_corrupt bytes={} error={err}",
                    raw.len()
                );
                SnapshotState::Corrupt
            }
        }
    }

    fn persist_locked(&self, document: &Document) -> StoreResult<()> {
        let started_at = Instant::now();
        match write_atomically(&self.snapshot_path, document) {
            Ok(()) => {
                debug!(
                    "event=snapshot_persist module=store status=ok topics={} notes={} duration_ms={}",
                    document.topics.len(),
                    document.note_count(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    "event=snapshot_persist module=store status=error duration_ms={} error_code=write_failure error={}",
                    started_at.elapsed().as_millis(),
                    source
                );
                Err(StoreError::WriteFailure {
                    path: self.snapshot_path.clone(),
                    source,
                })
            }
        }
    }
}

fn write_atomically(path: &Path, document: &Document) -> std::io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory)?;

    let mut staged = NamedTempFile::new_in(directory)?;
    serde_json::to_writer_pretty(&mut staged, document).map_err(std::io::Error::from)?;
    staged.write_all(b"\n")?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, SnapshotPolicy};
    use crate::model::document::{Document, Note};
    use crate::store::StoreError;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> DocumentStore {
        DocumentStore::open(dir.path().join("notes.json"))
    }

    #[test]
    fn load_missing_snapshot_is_empty_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().unwrap(), Document::new());
    }

    #[test]
    fn load_existing_reports_missing_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.load_existing().unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn corrupt_snapshot_heals_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.snapshot_path(), b"<data><topic").unwrap();

        assert_eq!(store.load().unwrap(), Document::new());
        assert_eq!(store.load_existing().unwrap(), Document::new());
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut document = Document::new();
        let first = document.topic_or_insert("first");
        first.notes.push(Note::new("a", "alpha"));
        first.notes.push(Note::new("a", ""));
        document
            .topic_or_insert("second")
            .notes
            .push(Note::new("b", "line one\nline two"));

        store.persist(&document).unwrap();
        assert_eq!(store.load().unwrap(), document);
    }

    #[test]
    fn persist_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path().join("nested/deeper/notes.json"));
        store.persist(&Document::new()).unwrap();
        assert!(store.snapshot_path().exists());
    }

    #[test]
    fn persist_into_unwritable_location_is_write_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();
        let store = DocumentStore::open(blocker.join("notes.json"));

        let err = store.persist(&Document::new()).unwrap_err();
        assert!(matches!(err, StoreError::WriteFailure { .. }));
    }

    #[test]
    fn write_closure_error_skips_persist() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let result: Result<(), StoreError> =
            store.write(SnapshotPolicy::CreateIfMissing, |document| {
                document.topic_or_insert("t").notes.push(Note::new("n", ""));
                Err(StoreError::NotFound(dir.path().to_path_buf()))
            });

        assert!(result.is_err());
        assert!(!store.snapshot_path().exists());
    }

    #[test]
    fn write_prunes_empty_topics_before_persist() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .write(SnapshotPolicy::CreateIfMissing, |document| {
                document.topic_or_insert("empty");
                document.topic_or_insert("full").notes.push(Note::new("n", ""));
                Ok::<_, StoreError>(())
            })
            .unwrap();

        let loaded = store.load_existing().unwrap();
        assert_eq!(loaded.topics.len(), 1);
        assert_eq!(loaded.topics[0].name, "full");
    }

    #[test]
    fn require_existing_write_fails_without_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store
            .write(SnapshotPolicy::RequireExisting, |_| Ok::<_, StoreError>(()))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!store.snapshot_path().exists());
    }

    #[test]
    fn unreadable_snapshot_is_read_failure_on_every_path() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        // A directory where the file should be fails the read with an I/O
        // error other than NotFound, regardless of the running user.
        std::fs::create_dir(store.snapshot_path()).unwrap();

        assert!(matches!(store.load(), Err(StoreError::ReadFailure { .. })));
        assert!(matches!(
            store.load_existing(),
            Err(StoreError::ReadFailure { .. })
        ));
        let read = store.read(|_| Ok::<_, StoreError>(()));
        assert!(matches!(read, Err(StoreError::ReadFailure { .. })));
    }

    #[test]
    fn create_if_missing_write_never_replaces_unreadable_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir(store.snapshot_path()).unwrap();
        std::fs::write(store.snapshot_path().join("marker"), b"keep").unwrap();

        let mut ran = false;
        let err = store
            .write(SnapshotPolicy::CreateIfMissing, |document| {
                ran = true;
                document.topic_or_insert("t").notes.push(Note::new("n", ""));
                Ok::<_, StoreError>(())
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::ReadFailure { .. }));
        assert!(!ran);
        assert!(store.snapshot_path().is_dir());
        assert!(store.snapshot_path().join("marker").exists());
    }

    #[test]
    fn snapshot_below_a_regular_file_counts_as_missing() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();
        let store = DocumentStore::open(blocker.join("notes.json"));

        assert_eq!(store.load().unwrap(), Document::new());
        assert!(matches!(store.load_existing(), Err(StoreError::NotFound(_))));
        let err = store
            .write(SnapshotPolicy::CreateIfMissing, |_| Ok::<_, StoreError>(()))
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteFailure { .. }));
    }
}

use notebook_core::{
    DocumentStore, EnrichmentError, LinkEnrichmentService, LookupError, NoteService, ResultId,
    SearchLookup, SnapshotNoteRepository,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct FixedLookup {
    ids: Vec<ResultId>,
    calls: AtomicUsize,
}

impl FixedLookup {
    fn new(ids: Vec<ResultId>) -> Arc<Self> {
        Arc::new(Self {
            ids,
            calls: AtomicUsize::new(0),
        })
    }
}

impl SearchLookup for FixedLookup {
    fn resolve(&self, _term: &str) -> Result<Vec<ResultId>, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ids.clone())
    }

    fn link_for(&self, id: ResultId) -> String {
        format!("https://lookup.test/?curid={id}")
    }

    fn source_label(&self) -> &str {
        "Test"
    }
}

struct TimedOut;

impl SearchLookup for TimedOut {
    fn resolve(&self, _term: &str) -> Result<Vec<ResultId>, LookupError> {
        Err(LookupError::Transport("operation timed out".to_string()))
    }

    fn link_for(&self, id: ResultId) -> String {
        id.to_string()
    }

    fn source_label(&self) -> &str {
        "Test"
    }
}

fn setup(
    lookup: Arc<dyn SearchLookup>,
) -> (
    TempDir,
    Arc<DocumentStore>,
    LinkEnrichmentService<SnapshotNoteRepository>,
) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(DocumentStore::open(dir.path().join("notes.json")));
    let service = LinkEnrichmentService::new(SnapshotNoteRepository::new(store.clone()), lookup);
    (dir, store, service)
}

#[test]
fn five_results_create_three_ranked_notes() {
    let lookup = FixedLookup::new(vec![501, 502, 503, 504, 505]);
    let (_dir, store, service) = setup(lookup.clone());

    let links = service.append_search_links("Research", "ferris").unwrap();
    assert_eq!(
        links,
        [
            "https://lookup.test/?curid=501",
            "https://lookup.test/?curid=502",
            "https://lookup.test/?curid=503",
        ]
    );
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);

    let notes = NoteService::new(SnapshotNoteRepository::new(store))
        .list_notes("Research")
        .unwrap();
    assert_eq!(notes.len(), 3);
    for (idx, note) in notes.iter().enumerate() {
        assert_eq!(note.name, format!("Test Link {} for ferris", idx + 1));
        assert_eq!(note.text, links[idx]);
        assert!(!note.timestamp.is_empty());
    }
}

#[test]
fn two_results_create_two_notes_without_padding() {
    let (_dir, store, service) = setup(FixedLookup::new(vec![7, 8]));

    let links = service.append_search_links("Short", "term").unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(store.load().unwrap().topic("Short").unwrap().notes.len(), 2);
}

#[test]
fn zero_results_commit_nothing() {
    let (_dir, store, service) = setup(FixedLookup::new(Vec::new()));

    let err = service.append_search_links("Empty", "nothing").unwrap_err();
    assert!(matches!(err, EnrichmentError::NoResults(term) if term == "nothing"));
    assert!(!store.snapshot_path().exists());
}

#[test]
fn lookup_timeout_is_lookup_unavailable() {
    let (_dir, _store, service) = setup(Arc::new(TimedOut));
    let err = service.append_search_links("Topic", "slow").unwrap_err();
    assert!(matches!(err, EnrichmentError::LookupUnavailable(_)));
}

#[test]
fn links_accumulate_into_existing_topic() {
    let (_dir, store, service) = setup(FixedLookup::new(vec![1, 2, 3]));
    let notes = NoteService::new(SnapshotNoteRepository::new(store.clone()));
    notes.add_note("Mixed", "manual", "written by hand").unwrap();

    service.append_search_links("Mixed", "a").unwrap();
    service.append_search_links("Mixed", "b").unwrap();

    let listed = notes.list_notes("Mixed").unwrap();
    assert_eq!(listed.len(), 7);
    assert_eq!(listed[0].name, "manual");
    assert_eq!(listed[1].name, "Test Link 1 for a");
    assert_eq!(listed[4].name, "Test Link 1 for b");
}

#[test]
fn concurrent_enrichments_land_as_contiguous_batches() {
    let (_dir, store, service) = setup(FixedLookup::new(vec![1, 2, 3, 4]));
    let service = Arc::new(service);

    let handles: Vec<_> = ["a", "b", "c", "d"]
        .into_iter()
        .map(|term| {
            let service = service.clone();
            std::thread::spawn(move || service.append_search_links("Batched", term))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let notes = store.load().unwrap().topic("Batched").unwrap().notes.clone();
    assert_eq!(notes.len(), 12);
    for batch in notes.chunks(3) {
        let term = batch[0].name.rsplit(' ').next().unwrap().to_string();
        for (idx, note) in batch.iter().enumerate() {
            assert_eq!(note.name, format!("Test Link {} for {term}", idx + 1));
        }
    }
}

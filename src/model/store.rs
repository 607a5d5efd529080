//! The catalog: authoritative, single-writer store of file records.
//!
//! The catalog is the only mutable shared state in the crate. Scan results
//! and deletions mutate it; every reader works on an immutable [`Snapshot`]
//! taken before background work is dispatched, so in-flight computations may
//! be stale but are never internally inconsistent. All derived state (the
//! cached [`DuplicateIndex`]) is invalidated wholesale on any mutation and
//! rebuilt on next read - no incremental patching.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::index::DuplicateIndex;
use crate::model::record::{FileRecord, RecordId, RootDirectory, RootId};
use crate::model::resolver::RootSet;

/// Single-writer store of tracked roots and scanned file records.
#[derive(Debug, Default)]
pub struct Catalog {
    roots: RootSet,
    records: BTreeMap<RecordId, FileRecord>,
    generation: u64,
    index: Option<Arc<DuplicateIndex>>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a root directory.
    pub fn add_root(&mut self, root: RootDirectory) {
        self.roots.insert(root);
        self.touch();
    }

    /// Stop tracking a root directory. Records under it stay in the catalog
    /// but become unresolvable, so they drop out of every path-keyed view.
    pub fn remove_root(&mut self, id: RootId) -> Option<RootDirectory> {
        let removed = self.roots.remove(id);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Insert or replace a scanned record.
    pub fn insert_record(&mut self, record: FileRecord) {
        log::trace!("Catalog insert {:?}: {}", record.id, record.relative_path);
        self.records.insert(record.id, record);
        self.touch();
    }

    /// Insert a batch of scanned records.
    pub fn insert_records(&mut self, records: impl IntoIterator<Item = FileRecord>) {
        let mut count = 0usize;
        for record in records {
            self.records.insert(record.id, record);
            count += 1;
        }
        if count > 0 {
            log::debug!("Catalog inserted {count} record(s)");
            self.touch();
        }
    }

    /// Remove a record, returning it if present.
    pub fn remove_record(&mut self, id: RecordId) -> Option<FileRecord> {
        let removed = self.records.remove(&id);
        if removed.is_some() {
            log::trace!("Catalog removed {id:?}");
            self.touch();
        }
        removed
    }

    /// Look up a record by id.
    #[must_use]
    pub fn record(&self, id: RecordId) -> Option<&FileRecord> {
        self.records.get(&id)
    }

    /// The tracked root set.
    #[must_use]
    pub fn roots(&self) -> &RootSet {
        &self.roots
    }

    /// Number of records in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Monotonic mutation counter; bumped on every root or record change.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Take a consistent, immutable snapshot of the current record set for
    /// background computation.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: Arc::new(self.records.values().cloned().collect()),
            roots: Arc::new(self.roots.clone()),
            generation: self.generation,
        }
    }

    /// The duplicate index over the current record set, rebuilt lazily after
    /// any mutation and cached until the next one.
    pub fn index(&mut self) -> Arc<DuplicateIndex> {
        if let Some(ref index) = self.index {
            return Arc::clone(index);
        }
        let index = Arc::new(self.snapshot().build_index());
        self.index = Some(Arc::clone(&index));
        index
    }

    /// Drop all derived state. Called automatically on mutation; exposed for
    /// callers that change external conditions (e.g. re-granted root access).
    pub fn invalidate(&mut self) {
        self.index = None;
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.index = None;
    }
}

/// Immutable view of the catalog at one generation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Arc<Vec<FileRecord>>,
    roots: Arc<RootSet>,
    generation: u64,
}

impl Snapshot {
    /// The records in this snapshot.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// The root set in this snapshot.
    #[must_use]
    pub fn roots(&self) -> &RootSet {
        &self.roots
    }

    /// Catalog generation this snapshot was taken at.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Build the duplicate index for this snapshot.
    #[must_use]
    pub fn build_index(&self) -> DuplicateIndex {
        DuplicateIndex::build(&self.records, self.roots.as_ref())
    }
}

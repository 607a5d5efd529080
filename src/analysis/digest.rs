//! Complete-duplicate directory detection.
//!
//! Two directories are complete duplicates when their sets of distinct
//! content hashes are equal (direct children only, non-recursive). The
//! relation is set equality, not multiset equality: a directory holding two
//! internal copies of one photo still mirrors a directory holding one copy.
//!
//! Directories with fewer than two files carry no signal and are skipped;
//! clusters require at least two directories sharing at least two distinct
//! hashes. O(D log D) after O(N) set construction.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::analysis::index::DuplicateIndex;
use crate::model::record::Hash;

/// A cluster of directories with identical distinct-hash sets.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteDuplicateDirectory {
    /// Lexicographically smallest path in the cluster.
    pub primary: String,
    /// The remaining directories mirroring the primary, path-sorted.
    pub duplicates: Vec<String>,
    /// Number of distinct hashes shared by the cluster.
    pub distinct_hashes: usize,
    /// File count of the primary directory.
    pub file_count: usize,
    /// Total bytes held by the primary directory.
    pub total_bytes: u64,
}

impl CompleteDuplicateDirectory {
    /// All directories in the cluster, primary first.
    #[must_use]
    pub fn all_directories(&self) -> Vec<&str> {
        std::iter::once(self.primary.as_str())
            .chain(self.duplicates.iter().map(String::as_str))
            .collect()
    }

    /// Whether a directory belongs to this cluster.
    #[must_use]
    pub fn contains(&self, directory: &str) -> bool {
        self.primary == directory || self.duplicates.iter().any(|d| d == directory)
    }
}

/// Find directories whose distinct-hash sets are identical.
///
/// Returns clusters sorted by primary path. Total function: any well-formed
/// index yields a result. Grouping by the exact hash set keeps the relation
/// symmetric and transitive, so no equivalence class can split across
/// clusters.
#[must_use]
pub fn complete_duplicates(index: &DuplicateIndex) -> Vec<CompleteDuplicateDirectory> {
    // Key each eligible directory by its sorted distinct-hash list.
    let mut by_hash_set: HashMap<Vec<Hash>, Vec<&str>> = HashMap::new();
    for (directory, records) in index.directories() {
        if records.len() < 2 {
            continue;
        }
        let distinct: BTreeSet<Hash> = records.iter().map(|r| r.record.hash).collect();
        let key: Vec<Hash> = distinct.into_iter().collect();
        by_hash_set.entry(key).or_default().push(directory);
    }

    let mut clusters: Vec<CompleteDuplicateDirectory> = by_hash_set
        .into_iter()
        .filter(|(key, dirs)| dirs.len() >= 2 && key.len() >= 2)
        .map(|(key, mut dirs)| {
            dirs.sort_unstable();
            let primary = dirs[0].to_string();
            let primary_records = &index.directories()[&primary];
            log::debug!(
                "Complete duplicate cluster: {} mirrored by {} other(s), {} distinct hashes",
                primary,
                dirs.len() - 1,
                key.len()
            );
            CompleteDuplicateDirectory {
                file_count: primary_records.len(),
                total_bytes: primary_records.iter().map(|r| r.record.size).sum(),
                duplicates: dirs[1..].iter().map(|d| (*d).to_string()).collect(),
                distinct_hashes: key.len(),
                primary,
            }
        })
        .collect();

    clusters.sort_by(|a, b| a.primary.cmp(&b.primary));

    log::info!("Digest comparison: {} complete-duplicate cluster(s)", clusters.len());
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::{FileRecord, RecordId, RootDirectory, RootId};
    use crate::model::resolver::RootSet;

    fn hash_of(byte: u8) -> Hash {
        let mut h = [0u8; 32];
        h[0] = byte;
        h
    }

    fn roots() -> RootSet {
        let mut set = RootSet::new();
        set.insert(RootDirectory::new(RootId(1), "/photos", "Photos"));
        set
    }

    fn record(id: u64, path: &str, byte: u8, size: u64) -> FileRecord {
        FileRecord::new(RecordId(id), RootId(1), path, hash_of(byte), size)
    }

    #[test]
    fn test_identical_hash_sets_cluster() {
        let records = vec![
            record(1, "a/one.jpg", 1, 10),
            record(2, "a/two.jpg", 2, 20),
            record(3, "b/one.jpg", 1, 10),
            record(4, "b/two.jpg", 2, 20),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        let clusters = complete_duplicates(&index);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].primary, "/photos/a");
        assert_eq!(clusters[0].duplicates, vec!["/photos/b"]);
        assert_eq!(clusters[0].distinct_hashes, 2);
        assert_eq!(clusters[0].file_count, 2);
        assert_eq!(clusters[0].total_bytes, 30);
    }

    #[test]
    fn test_partial_overlap_does_not_cluster() {
        let records = vec![
            record(1, "a/one.jpg", 1, 10),
            record(2, "a/two.jpg", 2, 20),
            record(3, "b/one.jpg", 1, 10),
            record(4, "b/three.jpg", 3, 30),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        assert!(complete_duplicates(&index).is_empty());
    }

    #[test]
    fn test_single_file_directories_skipped() {
        let records = vec![record(1, "a/one.jpg", 1, 10), record(2, "b/one.jpg", 1, 10)];
        let index = DuplicateIndex::build(&records, &roots());
        assert!(complete_duplicates(&index).is_empty());
    }

    #[test]
    fn test_single_hash_key_skipped() {
        // Two files each but only one distinct hash: no signal.
        let records = vec![
            record(1, "a/one.jpg", 1, 10),
            record(2, "a/copy.jpg", 1, 10),
            record(3, "b/one.jpg", 1, 10),
            record(4, "b/copy.jpg", 1, 10),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        assert!(complete_duplicates(&index).is_empty());
    }

    #[test]
    fn test_set_equality_ignores_internal_copies() {
        // Directory a holds an extra internal copy of hash 1; sets still equal.
        let records = vec![
            record(1, "a/one.jpg", 1, 10),
            record(2, "a/one-copy.jpg", 1, 10),
            record(3, "a/two.jpg", 2, 20),
            record(4, "b/one.jpg", 1, 10),
            record(5, "b/two.jpg", 2, 20),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        let clusters = complete_duplicates(&index);

        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].contains("/photos/a"));
        assert!(clusters[0].contains("/photos/b"));
    }

    #[test]
    fn test_transitive_class_never_splits() {
        let records = vec![
            record(1, "a/x.jpg", 1, 10),
            record(2, "a/y.jpg", 2, 10),
            record(3, "b/x.jpg", 1, 10),
            record(4, "b/y.jpg", 2, 10),
            record(5, "c/x.jpg", 1, 10),
            record(6, "c/y.jpg", 2, 10),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        let clusters = complete_duplicates(&index);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].all_directories().len(), 3);
    }
}

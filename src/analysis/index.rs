//! Hash index: grouping file records by content hash into duplicate groups.
//!
//! # Overview
//!
//! This is the first stage of the analysis pipeline. Every record is resolved
//! against its root directory exactly once, producing an [`IndexedRecord`]
//! with an absolute directory path; records whose root cannot be resolved are
//! excluded from every path-keyed structure and counted in
//! [`IndexStats::unresolved_records`], never silently mapped to an empty
//! path. Resolvable records are then grouped by content hash; only groups
//! with 2+ members survive.
//!
//! The build is O(N) and total: any well-formed input terminates and
//! produces an index. Data-integrity problems (members of one group
//! disagreeing on size) are surfaced as [`SizeMismatch`] warnings, not
//! failures.
//!
//! # Example
//!
//! ```
//! use photodupe::analysis::DuplicateIndex;
//! use photodupe::model::{FileRecord, RecordId, RootDirectory, RootId, RootSet};
//!
//! let mut roots = RootSet::new();
//! roots.insert(RootDirectory::new(RootId(1), "/photos", "Photos"));
//!
//! let records = vec![
//!     FileRecord::new(RecordId(1), RootId(1), "a.jpg", [7u8; 32], 100),
//!     FileRecord::new(RecordId(2), RootId(1), "copy/a.jpg", [7u8; 32], 100),
//! ];
//!
//! let index = DuplicateIndex::build(&records, &roots);
//! assert_eq!(index.groups().len(), 1);
//! assert_eq!(index.stats().wasted_bytes, 100);
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::model::record::{hash_to_hex, FileRecord, Hash, RecordId};
use crate::model::resolver::{Resolution, RootResolver};

/// A file record resolved to its absolute location.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedRecord {
    /// The underlying record.
    pub record: FileRecord,
    /// Absolute directory holding the file, forward-slash separated.
    pub directory: String,
    /// File name within the directory.
    pub file_name: String,
}

impl IndexedRecord {
    /// Absolute path of the file.
    #[must_use]
    pub fn absolute_path(&self) -> String {
        format!("{}/{}", self.directory, self.file_name)
    }
}

/// Confirmed duplicate group: all records sharing one content hash.
///
/// Always has 2+ members. Member order is deterministic: directory path,
/// then file name, then record id.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Shared content hash.
    pub hash: Hash,
    /// Member records in deterministic order.
    pub members: Vec<IndexedRecord>,
}

impl DuplicateGroup {
    /// Number of members (always >= 2).
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Groups are never empty; provided for clippy symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Nominal size of one copy. Members normally agree; when they disagree
    /// (upstream integrity violation) this is the largest reported size.
    #[must_use]
    pub fn nominal_size(&self) -> u64 {
        self.members.iter().map(|m| m.record.size).max().unwrap_or(0)
    }

    /// Whether all members report the same size.
    #[must_use]
    pub fn sizes_agree(&self) -> bool {
        self.members
            .windows(2)
            .all(|w| w[0].record.size == w[1].record.size)
    }

    /// Bytes occupied beyond one kept copy: sum of member sizes minus the
    /// largest single size. Equals `size * (members - 1)` when sizes agree.
    #[must_use]
    pub fn wasted_bytes(&self) -> u64 {
        let total: u64 = self.members.iter().map(|m| m.record.size).sum();
        total.saturating_sub(self.nominal_size())
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Identifiers of all members.
    #[must_use]
    pub fn member_ids(&self) -> Vec<RecordId> {
        self.members.iter().map(|m| m.record.id).collect()
    }
}

/// Warning raised when one group's members disagree on size.
#[derive(Debug, Clone, Serialize)]
pub struct SizeMismatch {
    /// Hash of the affected group.
    pub hash: Hash,
    /// Smallest reported size.
    pub min_size: u64,
    /// Largest reported size.
    pub max_size: u64,
    /// Member count of the affected group.
    pub members: usize,
}

/// Statistics and diagnostics from an index build.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Records presented to the builder.
    pub total_records: usize,
    /// Records with a resolvable root, included in the index.
    pub indexed_records: usize,
    /// Records excluded because their root could not be resolved.
    pub unresolved_records: usize,
    /// Total bytes across indexed records.
    pub total_bytes: u64,
    /// Number of duplicate groups (2+ members).
    pub duplicate_groups: usize,
    /// Records belonging to some duplicate group.
    pub duplicate_records: usize,
    /// Total bytes occupied beyond one kept copy per group.
    pub wasted_bytes: u64,
    /// Size-disagreement warnings, one per affected group.
    pub warnings: Vec<SizeMismatch>,
}

impl IndexStats {
    /// Percentage of indexed records that are duplicates.
    #[must_use]
    pub fn duplicate_rate(&self) -> f64 {
        if self.indexed_records == 0 {
            0.0
        } else {
            (self.duplicate_records as f64 / self.indexed_records as f64) * 100.0
        }
    }

    /// Wasted bytes as a human-readable string.
    #[must_use]
    pub fn wasted_display(&self) -> String {
        bytesize::ByteSize(self.wasted_bytes).to_string()
    }
}

/// Precomputed indices over one snapshot of the record set.
///
/// Holds the duplicate groups, a hash lookup, and a directory map over all
/// resolvable records, so downstream views (rollup, digest comparison,
/// overlap) never rescan the raw record list.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    groups: Vec<DuplicateGroup>,
    group_by_hash: HashMap<Hash, usize>,
    by_directory: BTreeMap<String, Vec<IndexedRecord>>,
    stats: IndexStats,
}

impl DuplicateIndex {
    /// Build the index from a snapshot of records and a root resolver.
    ///
    /// Total: never fails. Unresolvable roots and size disagreements are
    /// reported through [`IndexStats`].
    #[must_use]
    pub fn build(records: &[FileRecord], resolver: &dyn RootResolver) -> Self {
        let mut stats = IndexStats {
            total_records: records.len(),
            ..Default::default()
        };

        // Resolve every record once up front.
        let mut by_directory: BTreeMap<String, Vec<IndexedRecord>> = BTreeMap::new();
        let mut by_hash: HashMap<Hash, Vec<IndexedRecord>> = HashMap::new();

        for record in records {
            let root_path = match resolver.resolve(record.root) {
                Resolution::Resolved(path) => path,
                Resolution::Unresolved(reason) => {
                    log::warn!(
                        "Excluding record {:?} ({}): {}",
                        record.id,
                        record.relative_path,
                        reason
                    );
                    stats.unresolved_records += 1;
                    continue;
                }
            };

            let relative_dir = record.relative_dir();
            let directory = if relative_dir.is_empty() {
                root_path
            } else {
                format!("{root_path}/{relative_dir}")
            };
            let indexed = IndexedRecord {
                record: record.clone(),
                file_name: record.file_name().to_string(),
                directory,
            };

            stats.indexed_records += 1;
            stats.total_bytes += record.size;
            by_hash.entry(record.hash).or_default().push(indexed.clone());
            by_directory.entry(indexed.directory.clone()).or_default().push(indexed);
        }

        // Keep only hashes occurring 2+ times; order members deterministically.
        let mut groups: Vec<DuplicateGroup> = by_hash
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(hash, mut members)| {
                members.sort_by(|a, b| {
                    (&a.directory, &a.file_name, a.record.id)
                        .cmp(&(&b.directory, &b.file_name, b.record.id))
                });
                DuplicateGroup { hash, members }
            })
            .collect();
        groups.sort_by(|a, b| a.hash.cmp(&b.hash));

        for group in &groups {
            stats.duplicate_records += group.len();
            stats.wasted_bytes += group.wasted_bytes();
            if !group.sizes_agree() {
                let sizes: Vec<u64> = group.members.iter().map(|m| m.record.size).collect();
                let min_size = sizes.iter().copied().min().unwrap_or(0);
                let max_size = sizes.iter().copied().max().unwrap_or(0);
                log::warn!(
                    "Size mismatch within group {}: {} members, sizes {}..{}",
                    group.hash_hex(),
                    group.len(),
                    min_size,
                    max_size
                );
                stats.warnings.push(SizeMismatch {
                    hash: group.hash,
                    min_size,
                    max_size,
                    members: group.len(),
                });
            }
            log::debug!(
                "Duplicate group {}: {} members, {} wasted",
                group.hash_hex(),
                group.len(),
                group.wasted_bytes()
            );
        }
        stats.duplicate_groups = groups.len();

        let group_by_hash = groups
            .iter()
            .enumerate()
            .map(|(idx, g)| (g.hash, idx))
            .collect();

        log::info!(
            "Index built: {} records, {} groups, {} duplicates, {} wasted, {} unresolved",
            stats.indexed_records,
            stats.duplicate_groups,
            stats.duplicate_records,
            stats.wasted_display(),
            stats.unresolved_records
        );

        Self {
            groups,
            group_by_hash,
            by_directory,
            stats,
        }
    }

    /// Duplicate groups, sorted by hash.
    #[must_use]
    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// The group holding the given hash, if it is a duplicate hash.
    #[must_use]
    pub fn group_for(&self, hash: &Hash) -> Option<&DuplicateGroup> {
        self.group_by_hash.get(hash).map(|&idx| &self.groups[idx])
    }

    /// Whether the hash occurs 2+ times in the snapshot.
    #[must_use]
    pub fn is_duplicate(&self, hash: &Hash) -> bool {
        self.group_by_hash.contains_key(hash)
    }

    /// All resolvable records keyed by absolute directory.
    #[must_use]
    pub fn directories(&self) -> &BTreeMap<String, Vec<IndexedRecord>> {
        &self.by_directory
    }

    /// Build statistics and diagnostics.
    #[must_use]
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::{RootDirectory, RootId};
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
    fn test_build_empty() {
        let index = DuplicateIndex::build(&[], &roots());
        assert!(index.groups().is_empty());
        assert_eq!(index.stats().total_records, 0);
    }

    #[test]
    fn test_groups_require_two_members() {
        let records = vec![
            record(1, "a.jpg", 1, 100),
            record(2, "b.jpg", 2, 100),
            record(3, "c.jpg", 2, 100),
        ];
        let index = DuplicateIndex::build(&records, &roots());

        assert_eq!(index.groups().len(), 1);
        assert_eq!(index.groups()[0].hash, hash_of(2));
        assert!(!index.is_duplicate(&hash_of(1)));
        assert!(index.is_duplicate(&hash_of(2)));
        assert_eq!(index.stats().duplicate_records, 2);
    }

    #[test]
    fn test_member_order_by_directory_then_name() {
        let records = vec![
            record(1, "zoo/a.jpg", 1, 100),
            record(2, "a.jpg", 1, 100),
            record(3, "zoo/Z.jpg", 1, 100),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        let members = &index.groups()[0].members;

        assert_eq!(members[0].directory, "/photos");
        assert_eq!(members[1].directory, "/photos/zoo");
        assert_eq!(members[1].file_name, "Z.jpg");
        assert_eq!(members[2].file_name, "a.jpg");
    }

    #[test]
    fn test_wasted_bytes_equal_sizes() {
        let records = vec![
            record(1, "a.jpg", 1, 1000),
            record(2, "b.jpg", 1, 1000),
            record(3, "c.jpg", 1, 1000),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        let group = &index.groups()[0];

        assert_eq!(group.wasted_bytes(), 2000);
        assert!(group.sizes_agree());
        assert!(index.stats().warnings.is_empty());
    }

    #[test]
    fn test_size_mismatch_emits_warning_not_failure() {
        let records = vec![record(1, "a.jpg", 1, 100), record(2, "b.jpg", 1, 80)];
        let index = DuplicateIndex::build(&records, &roots());

        // Group still emitted; wasted = sum - max.
        assert_eq!(index.groups().len(), 1);
        assert_eq!(index.groups()[0].wasted_bytes(), 80);
        assert_eq!(index.stats().warnings.len(), 1);
        let warning = &index.stats().warnings[0];
        assert_eq!(warning.min_size, 80);
        assert_eq!(warning.max_size, 100);
    }

    #[test]
    fn test_unresolved_root_excluded_and_counted() {
        let records = vec![
            record(1, "a.jpg", 1, 100),
            FileRecord::new(RecordId(2), RootId(9), "ghost.jpg", hash_of(1), 100),
        ];
        let index = DuplicateIndex::build(&records, &roots());

        // The resolvable copy is now unique, so no group forms.
        assert!(index.groups().is_empty());
        assert_eq!(index.stats().unresolved_records, 1);
        assert_eq!(index.stats().indexed_records, 1);
        assert!(!index.directories().keys().any(|d| d.is_empty()));
    }

    #[test]
    fn test_directory_map_covers_all_indexed_records() {
        let records = vec![
            record(1, "a.jpg", 1, 100),
            record(2, "sub/b.jpg", 2, 50),
            record(3, "sub/c.jpg", 2, 50),
        ];
        let index = DuplicateIndex::build(&records, &roots());

        assert_eq!(index.directories().len(), 2);
        assert_eq!(index.directories()["/photos"].len(), 1);
        assert_eq!(index.directories()["/photos/sub"].len(), 2);
    }

    #[test]
    fn test_deterministic_group_order() {
        let records = vec![
            record(1, "a.jpg", 3, 10),
            record(2, "b.jpg", 3, 10),
            record(3, "c.jpg", 1, 10),
            record(4, "d.jpg", 1, 10),
        ];
        let index = DuplicateIndex::build(&records, &roots());
        assert_eq!(index.groups()[0].hash, hash_of(1));
        assert_eq!(index.groups()[1].hash, hash_of(3));
    }
}

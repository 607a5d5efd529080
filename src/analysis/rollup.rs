//! Per-directory duplicate rollup.
//!
//! Aggregates, for every absolute directory in the index, the file count,
//! how many of those files belong to some duplicate group, and the bytes
//! wasted by extra copies held there.
//!
//! # Waste attribution
//!
//! Waste is not charged to one "canonical" file. For each group, the first
//! member in the group's deterministic order is the kept copy; every later
//! member charges its own size to the directory holding that extra copy. A
//! group spread over three directories therefore spreads its waste over the
//! directories holding the second and third copies.

use serde::Serialize;

use crate::analysis::index::DuplicateIndex;

/// Duplicate statistics for one absolute directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryDuplicateInfo {
    /// Absolute directory path.
    pub directory: String,
    /// Total files in the directory.
    pub file_count: usize,
    /// Files belonging to some duplicate group.
    pub duplicate_file_count: usize,
    /// Bytes charged to this directory for extra copies it holds.
    pub wasted_bytes: u64,
    /// Duplicate files as a percentage of all files in the directory.
    pub duplicate_percentage: f64,
}

impl DirectoryDuplicateInfo {
    /// Wasted bytes as a human-readable string.
    #[must_use]
    pub fn wasted_display(&self) -> String {
        bytesize::ByteSize(self.wasted_bytes).to_string()
    }
}

/// Aggregate duplicate statistics per directory.
///
/// Returns one entry per directory in the index, sorted by duplicate file
/// count descending, ties broken by path ascending. Total function; O(N).
#[must_use]
pub fn rollup_directories(index: &DuplicateIndex) -> Vec<DirectoryDuplicateInfo> {
    // Attribute group members to their directories: every member counts as a
    // duplicate file; members past the first (kept) copy charge their size.
    let mut attribution: std::collections::BTreeMap<&str, (usize, u64)> =
        std::collections::BTreeMap::new();
    for group in index.groups() {
        for (ordinal, member) in group.members.iter().enumerate() {
            let entry = attribution.entry(member.directory.as_str()).or_default();
            entry.0 += 1;
            if ordinal > 0 {
                entry.1 += member.record.size;
            }
        }
    }

    let mut rollup: Vec<DirectoryDuplicateInfo> = index
        .directories()
        .iter()
        .map(|(directory, records)| {
            let (duplicate_file_count, wasted_bytes) = attribution
                .get(directory.as_str())
                .copied()
                .unwrap_or_default();
            let file_count = records.len();
            let duplicate_percentage = if file_count == 0 {
                0.0
            } else {
                (duplicate_file_count as f64 / file_count as f64) * 100.0
            };
            DirectoryDuplicateInfo {
                directory: directory.clone(),
                file_count,
                duplicate_file_count,
                wasted_bytes,
                duplicate_percentage,
            }
        })
        .collect();

    rollup.sort_by(|a, b| {
        b.duplicate_file_count
            .cmp(&a.duplicate_file_count)
            .then_with(|| a.directory.cmp(&b.directory))
    });

    log::debug!(
        "Rollup complete: {} directories, {} with duplicates",
        rollup.len(),
        rollup.iter().filter(|i| i.duplicate_file_count > 0).count()
    );

    rollup
}

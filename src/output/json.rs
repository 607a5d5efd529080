//! JSON export of a full analysis pass.
//!
//! Bundles the four derived views into one document for downstream tooling.
//! The overlap section is optional: when the pairwise sweep timed out or was
//! never run, the field is absent rather than an empty list, so consumers
//! cannot mistake "no result" for "no overlap".

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::analysis::digest::CompleteDuplicateDirectory;
use crate::analysis::index::{DuplicateGroup, DuplicateIndex};
use crate::analysis::overlap::DirectoryPair;
use crate::analysis::rollup::DirectoryDuplicateInfo;

/// Errors that can occur during JSON export.
#[derive(Debug, Error)]
pub enum JsonExportError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct StatsSection {
    total_records: usize,
    indexed_records: usize,
    unresolved_records: usize,
    duplicate_groups: usize,
    duplicate_records: usize,
    wasted_bytes: u64,
    size_mismatch_warnings: usize,
}

/// A full analysis report ready for serialization.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    stats: StatsSection,
    groups: &'a [DuplicateGroup],
    directories: &'a [DirectoryDuplicateInfo],
    complete_duplicates: &'a [CompleteDuplicateDirectory],
    #[serde(skip_serializing_if = "Option::is_none")]
    overlap: Option<&'a [DirectoryPair]>,
}

impl<'a> JsonReport<'a> {
    /// Assemble a report. Pass `None` for `overlap` when the pairwise sweep
    /// produced no result.
    #[must_use]
    pub fn new(
        index: &'a DuplicateIndex,
        directories: &'a [DirectoryDuplicateInfo],
        complete_duplicates: &'a [CompleteDuplicateDirectory],
        overlap: Option<&'a [DirectoryPair]>,
    ) -> Self {
        let stats = index.stats();
        Self {
            stats: StatsSection {
                total_records: stats.total_records,
                indexed_records: stats.indexed_records,
                unresolved_records: stats.unresolved_records,
                duplicate_groups: stats.duplicate_groups,
                duplicate_records: stats.duplicate_records,
                wasted_bytes: stats.wasted_bytes,
                size_mismatch_warnings: stats.warnings.len(),
            },
            groups: index.groups(),
            directories,
            complete_duplicates,
            overlap,
        }
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`JsonExportError`] if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), JsonExportError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Render the report as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`JsonExportError`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, JsonExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::digest::complete_duplicates;
    use crate::analysis::rollup::rollup_directories;
    use crate::model::record::{FileRecord, Hash, RecordId, RootDirectory, RootId};
    use crate::model::resolver::RootSet;

    fn hash_of(byte: u8) -> Hash {
        let mut h = [0u8; 32];
        h[0] = byte;
        h
    }

    fn index() -> DuplicateIndex {
        let mut roots = RootSet::new();
        roots.insert(RootDirectory::new(RootId(1), "/photos", "Photos"));
        let records = vec![
            FileRecord::new(RecordId(1), RootId(1), "a.jpg", hash_of(1), 100),
            FileRecord::new(RecordId(2), RootId(1), "b.jpg", hash_of(1), 100),
        ];
        DuplicateIndex::build(&records, &roots)
    }

    #[test]
    fn test_report_serializes() {
        let index = index();
        let rollup = rollup_directories(&index);
        let clusters = complete_duplicates(&index);

        let json = JsonReport::new(&index, &rollup, &clusters, None)
            .to_json_string()
            .unwrap();

        assert!(json.contains("\"duplicate_groups\": 1"));
        assert!(json.contains("\"wasted_bytes\": 100"));
        assert!(json.contains("\"duplicate_percentage\": 100.0"));
        // Absent overlap is omitted entirely.
        assert!(!json.contains("\"overlap\""));
    }

    #[test]
    fn test_report_includes_overlap_when_present() {
        let index = index();
        let rollup = rollup_directories(&index);
        let clusters = complete_duplicates(&index);
        let pairs = vec![DirectoryPair {
            path_a: "/photos/a".to_string(),
            path_b: "/photos/b".to_string(),
            shared_duplicates: 2,
            wasted_bytes: 100,
        }];

        let json = JsonReport::new(&index, &rollup, &clusters, Some(&pairs))
            .to_json_string()
            .unwrap();

        assert!(json.contains("\"overlap\""));
        assert!(json.contains("\"shared_duplicates\": 2"));
    }
}

//! CSV export for duplicate groups and directory pairs.
//!
//! Two shapes, both machine-readable for spreadsheets and data analysis:
//!
//! - **Group export**: one row per duplicate-group member with columns
//!   `group_id`, `hash`, `path`, `size`, `captured` (RFC 3339 or empty).
//! - **Pair export**: one row per directory pair with columns `path_a`,
//!   `path_b`, `shared_duplicates`, `wasted_bytes`.

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::analysis::index::DuplicateGroup;
use crate::analysis::overlap::DirectoryPair;

/// Errors that can occur during CSV export.
#[derive(Debug, Error)]
pub enum CsvExportError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct GroupRow {
    group_id: usize,
    hash: String,
    path: String,
    size: u64,
    captured: String,
}

/// CSV export of duplicate groups, one row per member file.
pub struct GroupCsvExport<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> GroupCsvExport<'a> {
    /// Create an export over the given groups.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write CSV rows to the given writer.
    ///
    /// # Errors
    ///
    /// Returns [`CsvExportError`] if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            let hash = group.hash_hex();
            for member in &group.members {
                csv_writer.serialize(GroupRow {
                    group_id: idx + 1,
                    hash: hash.clone(),
                    path: member.absolute_path(),
                    size: member.record.size,
                    captured: member
                        .record
                        .captured
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default(),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Render the export as a string.
    ///
    /// # Errors
    ///
    /// Returns [`CsvExportError`] if serialization fails.
    pub fn to_csv_string(&self) -> Result<String, CsvExportError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

/// CSV export of directory pairs, one row per pair.
pub struct PairCsvExport<'a> {
    pairs: &'a [DirectoryPair],
}

impl<'a> PairCsvExport<'a> {
    /// Create an export over the given pairs.
    #[must_use]
    pub fn new(pairs: &'a [DirectoryPair]) -> Self {
        Self { pairs }
    }

    /// Write CSV rows to the given writer.
    ///
    /// # Errors
    ///
    /// Returns [`CsvExportError`] if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for pair in self.pairs {
            csv_writer.serialize(pair)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Render the export as a string.
    ///
    /// # Errors
    ///
    /// Returns [`CsvExportError`] if serialization fails.
    pub fn to_csv_string(&self) -> Result<String, CsvExportError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

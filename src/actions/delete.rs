//! Safe deletion of selected duplicate records.
//!
//! # Overview
//!
//! The coordinator removes user-chosen records from the catalog, delegating
//! physical deletion (move to system trash, recoverable) to the [`Trasher`]
//! collaborator. Deletions are independent: a failure on one file never
//! blocks attempts on the rest, and the batch always produces an aggregate
//! report of successes and per-file failures, never an all-or-nothing
//! result.
//!
//! Policy stays with the caller: deleting the last member of a duplicate
//! group is not forbidden here. After a physical deletion succeeds the
//! record leaves the catalog, which drops all derived state wholesale for
//! rebuild on next read.
//!
//! # Example
//!
//! ```no_run
//! use photodupe::actions::DeletionCoordinator;
//! use photodupe::model::{Catalog, RecordId};
//!
//! let mut catalog = Catalog::new();
//! let coordinator = DeletionCoordinator::system();
//! let report = coordinator.delete_batch(&mut catalog, &[RecordId(1)], "manual-review");
//! println!("{}", report.summary());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::record::RecordId;
use crate::model::resolver::{Resolution, RootResolver};
use crate::model::store::Catalog;

/// Error from the physical deletion collaborator.
#[derive(Debug, Error)]
pub enum TrashError {
    /// File was not found (may have been deleted or moved since the scan).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    Failed {
        /// Path the operation was attempted on.
        path: PathBuf,
        /// Backend-reported reason.
        message: String,
    },
}

/// Filesystem collaborator that performs the physical move-to-trash.
///
/// The core never touches the filesystem itself; security-scoped access
/// handling lives behind this seam. Tests substitute an in-memory fake.
pub trait Trasher: Send + Sync {
    /// Move the file at `path` to the system trash.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError`] when the file is missing or the backend fails.
    fn trash(&self, path: &Path) -> Result<(), TrashError>;
}

/// Default collaborator backed by the system trash.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrasher;

impl Trasher for SystemTrasher {
    fn trash(&self, path: &Path) -> Result<(), TrashError> {
        if !path.exists() {
            return Err(TrashError::NotFound(path.to_path_buf()));
        }
        trash::delete(path).map_err(|e| {
            log::error!("Trash operation failed for {}: {e}", path.display());
            TrashError::Failed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })
    }
}

/// One failed deletion within a batch.
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    /// Record that could not be deleted.
    pub id: RecordId,
    /// Human-readable reason.
    pub reason: String,
}

/// Aggregate result of a deletion batch.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteReport {
    /// Records whose physical deletion succeeded and that left the catalog.
    pub succeeded: Vec<RecordId>,
    /// Per-record failures; the batch continued past each one.
    pub failed: Vec<DeleteFailure>,
    /// Total bytes freed by successful deletions.
    pub bytes_freed: u64,
    /// Caller-supplied audit tag, carried through unused.
    pub audit_tag: String,
}

impl BatchDeleteReport {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Check if every requested deletion succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable summary of the batch.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {freed}", self.success_count())
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {freed}",
                self.success_count(),
                self.failure_count()
            )
        }
    }
}

/// Coordinates batch deletion of records through a [`Trasher`].
pub struct DeletionCoordinator {
    trasher: Box<dyn Trasher>,
}

impl DeletionCoordinator {
    /// Create a coordinator over a custom trasher.
    #[must_use]
    pub fn new(trasher: Box<dyn Trasher>) -> Self {
        Self { trasher }
    }

    /// Create a coordinator over the system trash.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Box::new(SystemTrasher))
    }

    /// Delete the given records, one file at a time.
    ///
    /// Unknown ids and records under unresolvable roots become per-record
    /// failures. Each successful physical deletion removes the record from
    /// the catalog immediately, so a crash mid-batch leaves the catalog
    /// consistent with disk. Derived state is invalidated by the removals
    /// and rebuilt on next read.
    ///
    /// Intended to run on the caller's background execution context; the
    /// report is the single aggregate completion message.
    pub fn delete_batch(
        &self,
        catalog: &mut Catalog,
        ids: &[RecordId],
        audit_tag: &str,
    ) -> BatchDeleteReport {
        let mut report = BatchDeleteReport {
            audit_tag: audit_tag.to_string(),
            ..Default::default()
        };

        log::info!("Deleting {} record(s) (tag: {audit_tag})", ids.len());

        for &id in ids {
            let (path, size) = match Self::locate(catalog, id) {
                Ok(located) => located,
                Err(reason) => {
                    log::warn!("Skipping {id:?}: {reason}");
                    report.failed.push(DeleteFailure { id, reason });
                    continue;
                }
            };

            match self.trasher.trash(&path) {
                Ok(()) => {
                    log::debug!("Moved to trash: {} ({size} bytes)", path.display());
                    catalog.remove_record(id);
                    report.succeeded.push(id);
                    report.bytes_freed += size;
                }
                Err(e) => {
                    log::warn!("Deletion failed for {}: {e}", path.display());
                    report.failed.push(DeleteFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!("{}", report.summary());
        report
    }

    fn locate(catalog: &Catalog, id: RecordId) -> Result<(PathBuf, u64), String> {
        let record = catalog
            .record(id)
            .ok_or_else(|| format!("unknown record id {}", id.0))?;
        match catalog.roots().resolve(record.root) {
            Resolution::Resolved(root_path) => Ok((
                PathBuf::from(format!("{root_path}/{}", record.relative_path)),
                record.size,
            )),
            Resolution::Unresolved(reason) => Err(format!("root unresolved: {reason}")),
        }
    }
}

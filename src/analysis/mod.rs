//! Duplicate analysis: index build, directory rollup, complete-duplicate
//! detection, pairwise overlap, and the background overlap scheduler.

pub mod digest;
pub mod index;
pub mod overlap;
pub mod rollup;
pub mod task;

pub use digest::{complete_duplicates, CompleteDuplicateDirectory};
pub use index::{DuplicateGroup, DuplicateIndex, IndexStats, IndexedRecord, SizeMismatch};
pub use overlap::{analyze_overlap, DirectoryPair, OverlapConfig, OverlapError, OverlapReport};
pub use rollup::{rollup_directories, DirectoryDuplicateInfo};
pub use task::{CancelToken, OverlapOutcome, OverlapScheduler};

//! PhotoDupe - Duplicate Analysis Core for Photo Libraries
//!
//! An in-process library that indexes scanned photo records under tracked
//! root directories, identifies exact-content duplicates (32-byte content
//! digests supplied by the scanning layer), aggregates duplicate statistics
//! per directory, detects whole-directory duplication, computes pairwise
//! directory overlap, and coordinates safe move-to-trash deletion of chosen
//! records.
//!
//! The crate performs no filesystem scanning, hashing, or UI work itself:
//! scan results flow in as [`model::FileRecord`] values, physical deletion is
//! delegated through the [`actions::Trasher`] trait, and all analysis outputs
//! are plain data suitable for rendering or export.

pub mod actions;
pub mod analysis;
pub mod logging;
pub mod model;
pub mod output;

//! File actions: safe deletion of selected duplicate records.

pub mod delete;

pub use delete::{
    BatchDeleteReport, DeleteFailure, DeletionCoordinator, SystemTrasher, TrashError, Trasher,
};

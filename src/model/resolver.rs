//! Root resolution: mapping a [`RootId`] to an absolute directory path.
//!
//! Resolution is explicit: a record whose root is missing yields
//! [`Resolution::Unresolved`] with a reason, never a silently substituted
//! relative path, so error paths cannot be mistaken for valid directory keys.

use std::collections::HashMap;

use crate::model::record::{RootDirectory, RootId};

/// Outcome of resolving a root identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Root exists; value is its absolute path (no trailing slash).
    Resolved(String),
    /// Root is missing or inaccessible; value is a diagnostic reason.
    Unresolved(String),
}

impl Resolution {
    /// The resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::Unresolved(_) => None,
        }
    }
}

/// Maps root identifiers to absolute paths.
///
/// The catalog's [`RootSet`] is the canonical implementation; tests and
/// callers with exotic storage can supply their own.
pub trait RootResolver {
    /// Resolve a root identifier to an absolute directory path.
    fn resolve(&self, root: RootId) -> Resolution;
}

/// In-memory set of tracked root directories.
#[derive(Debug, Clone, Default)]
pub struct RootSet {
    roots: HashMap<RootId, RootDirectory>,
}

impl RootSet {
    /// Create an empty root set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a root directory.
    pub fn insert(&mut self, root: RootDirectory) {
        log::debug!("Tracking root {:?} at {}", root.id, root.path);
        self.roots.insert(root.id, root);
    }

    /// Remove a tracked root. Records under it become unresolvable and drop
    /// out of every path-keyed structure on the next rebuild.
    pub fn remove(&mut self, id: RootId) -> Option<RootDirectory> {
        self.roots.remove(&id)
    }

    /// Look up a root directory.
    #[must_use]
    pub fn get(&self, id: RootId) -> Option<&RootDirectory> {
        self.roots.get(&id)
    }

    /// Number of tracked roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if no roots are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl RootResolver for RootSet {
    fn resolve(&self, root: RootId) -> Resolution {
        match self.roots.get(&root) {
            Some(dir) => Resolution::Resolved(dir.path.clone()),
            None => Resolution::Unresolved(format!("unknown root id {}", root.0)),
        }
    }
}

//! Pairwise directory overlap analysis.
//!
//! # Overview
//!
//! For directories that share duplicate files but are not complete
//! duplicates of each other, this module reports how much content they
//! share, so a user can decide which side of a partial mirror to keep.
//!
//! The sweep is restricted to the pruned universe of directories holding at
//! least one duplicate file, with a per-directory hash-to-count map over
//! duplicate-bearing hashes only. It is still O(D'^2 * overlap) in the worst
//! case, so three safety bounds apply:
//!
//! - a hard cap on the number of duplicate groups scanned (default 10,000),
//!   reported through [`OverlapReport::truncated`] when hit;
//! - a wall-clock timeout (default 30 s) after which the caller receives
//!   [`OverlapError::TimedOut`], never a silently partial result;
//! - cooperative cancellation via [`CancelToken`], checked at pair
//!   granularity, so a superseding request stops work promptly.
//!
//! The sweep runs on rayon; every worker observes the same deadline and
//! token. Results are deterministic: running twice on an unchanged snapshot
//! yields identical pairs in identical order.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::analysis::digest::CompleteDuplicateDirectory;
use crate::analysis::index::DuplicateIndex;
use crate::analysis::task::CancelToken;
use crate::model::record::Hash;

/// Default cap on duplicate groups scanned per analysis.
pub const DEFAULT_MAX_GROUPS: usize = 10_000;

/// Default wall-clock budget for one analysis.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the bounded overlap sweep.
///
/// Both variants mean "no result": downstream must treat them as first-class
/// absence, distinct from an empty pair list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlapError {
    /// The wall-clock budget was exceeded. The caller may retry.
    #[error("pairwise overlap analysis timed out after {0:?}")]
    TimedOut(Duration),

    /// A superseding request cancelled this one. Discarded, not surfaced.
    #[error("pairwise overlap analysis cancelled")]
    Cancelled,
}

/// Shared-duplicate statistics for one unordered directory pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryPair {
    /// First directory (lexicographically smaller path).
    pub path_a: String,
    /// Second directory.
    pub path_b: String,
    /// Total duplicate occurrences across both sides of shared hashes.
    pub shared_duplicates: u64,
    /// Estimated bytes reclaimable if the pair kept one copy per shared hash.
    pub wasted_bytes: u64,
}

/// Configuration for the overlap sweep.
#[derive(Debug, Clone)]
pub struct OverlapConfig {
    /// Cap on duplicate groups scanned.
    pub max_groups: usize,
    /// Wall-clock budget.
    pub timeout: Duration,
    /// Cooperative cancellation token.
    pub cancel: CancelToken,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            max_groups: DEFAULT_MAX_GROUPS,
            timeout: DEFAULT_TIMEOUT,
            cancel: CancelToken::new(),
        }
    }
}

impl OverlapConfig {
    /// Set the duplicate-group cap.
    #[must_use]
    pub fn with_max_groups(mut self, max_groups: usize) -> Self {
        self.max_groups = max_groups.max(1);
        self
    }

    /// Set the wall-clock budget.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Thread a cancellation token through the sweep.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Result of a completed overlap sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapReport {
    /// Pairs with a non-empty shared-hash intersection, sorted by
    /// `shared_duplicates` descending, then by paths ascending.
    pub pairs: Vec<DirectoryPair>,
    /// True when the group cap cut the scan short.
    pub truncated: bool,
    /// Duplicate groups actually scanned.
    pub scanned_groups: usize,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

/// True when `ancestor` is a path-component prefix of `descendant`.
fn is_ancestor(ancestor: &str, descendant: &str) -> bool {
    descendant.len() > ancestor.len()
        && descendant.starts_with(ancestor)
        && descendant.as_bytes()[ancestor.len()] == b'/'
}

/// Compute shared-duplicate statistics for every directory pair in the
/// pruned universe.
///
/// Two kinds of pairs are skipped: directories belonging to the same
/// complete-duplicate cluster (their relationship is already reported by
/// [`complete_duplicates`](crate::analysis::digest::complete_duplicates)),
/// and a directory with its own ancestor (one tree is not a merge
/// candidate against itself).
///
/// # Errors
///
/// [`OverlapError::TimedOut`] when the budget elapses and
/// [`OverlapError::Cancelled`] when the token fires. In both cases no
/// partial result escapes.
pub fn analyze_overlap(
    index: &DuplicateIndex,
    clusters: &[CompleteDuplicateDirectory],
    config: &OverlapConfig,
) -> Result<OverlapReport, OverlapError> {
    let start = Instant::now();
    let deadline = start + config.timeout;

    let all_groups = index.groups();
    let truncated = all_groups.len() > config.max_groups;
    let scanned = &all_groups[..all_groups.len().min(config.max_groups)];
    if truncated {
        log::warn!(
            "Overlap analysis truncated: scanning {} of {} duplicate groups",
            scanned.len(),
            all_groups.len()
        );
    }

    // Per-directory counts over duplicate-bearing hashes only, plus the
    // nominal size of each scanned hash.
    let mut hash_size: HashMap<Hash, u64> = HashMap::with_capacity(scanned.len());
    let mut dir_counts: BTreeMap<&str, HashMap<Hash, u64>> = BTreeMap::new();
    for group in scanned {
        hash_size.insert(group.hash, group.nominal_size());
        for member in &group.members {
            *dir_counts
                .entry(member.directory.as_str())
                .or_default()
                .entry(group.hash)
                .or_insert(0) += 1;
        }
    }

    let cluster_of: HashMap<&str, usize> = clusters
        .iter()
        .enumerate()
        .flat_map(|(idx, cluster)| {
            cluster
                .all_directories()
                .into_iter()
                .map(move |dir| (dir, idx))
        })
        .collect();

    // BTreeMap iteration gives a path-sorted universe, so pair (i, j) with
    // i < j always has path_a < path_b and the output order is reproducible.
    let universe: Vec<(&str, &HashMap<Hash, u64>)> =
        dir_counts.iter().map(|(dir, counts)| (*dir, counts)).collect();
    log::info!(
        "Overlap sweep: {} directories, {} groups",
        universe.len(),
        scanned.len()
    );

    let swept: Result<Vec<Vec<DirectoryPair>>, OverlapError> = (0..universe.len())
        .into_par_iter()
        .map(|i| {
            let (path_a, counts_a) = universe[i];
            let mut local = Vec::new();
            for &(path_b, counts_b) in &universe[i + 1..] {
                if config.cancel.is_cancelled() {
                    return Err(OverlapError::Cancelled);
                }
                if Instant::now() > deadline {
                    return Err(OverlapError::TimedOut(config.timeout));
                }
                // path_a < path_b, so only path_a can be the ancestor.
                if is_ancestor(path_a, path_b) {
                    continue;
                }
                if let (Some(a), Some(b)) = (cluster_of.get(path_a), cluster_of.get(path_b)) {
                    if a == b {
                        continue;
                    }
                }

                // Intersect the smaller map against the larger.
                let (small, large) = if counts_a.len() <= counts_b.len() {
                    (counts_a, counts_b)
                } else {
                    (counts_b, counts_a)
                };
                let mut shared = 0u64;
                let mut wasted = 0u64;
                for (hash, &count_small) in small {
                    if let Some(&count_large) = large.get(hash) {
                        let occurrences = count_small + count_large;
                        shared += occurrences;
                        let size = hash_size.get(hash).copied().unwrap_or(0);
                        wasted += size * (occurrences - 1);
                    }
                }
                if shared > 0 {
                    local.push(DirectoryPair {
                        path_a: path_a.to_string(),
                        path_b: path_b.to_string(),
                        shared_duplicates: shared,
                        wasted_bytes: wasted,
                    });
                }
            }
            Ok(local)
        })
        .collect();

    let mut pairs: Vec<DirectoryPair> = swept?.into_iter().flatten().collect();
    pairs.sort_by(|a, b| {
        b.shared_duplicates
            .cmp(&a.shared_duplicates)
            .then_with(|| (&a.path_a, &a.path_b).cmp(&(&b.path_a, &b.path_b)))
    });

    let elapsed = start.elapsed();
    log::info!(
        "Overlap sweep complete: {} pair(s) in {:?}{}",
        pairs.len(),
        elapsed,
        if truncated { " (truncated)" } else { "" }
    );

    Ok(OverlapReport {
        pairs,
        truncated,
        scanned_groups: scanned.len(),
        elapsed,
    })
}

//! Background execution for the overlap sweep.
//!
//! The quadratic pairwise analysis must never run on the interactive thread,
//! and exactly one computation is authoritative per scheduler: submitting a
//! new request cooperatively cancels the prior one, and a superseded or
//! cancelled result is discarded, never merged or surfaced as an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::analysis::digest::complete_duplicates;
use crate::analysis::index::DuplicateIndex;
use crate::analysis::overlap::{analyze_overlap, OverlapConfig, OverlapError, OverlapReport};

/// Cooperative cancellation token.
///
/// Cloning shares the underlying flag; any clone can cancel. Long loops
/// check [`CancelToken::is_cancelled`] at their boundary and bail out.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// One aggregate completion message from a background overlap sweep.
#[derive(Debug)]
pub enum OverlapOutcome {
    /// The sweep finished inside its bounds.
    Completed {
        /// Scheduler generation of the request.
        generation: u64,
        /// The full report.
        report: OverlapReport,
    },
    /// The sweep exceeded its wall-clock budget; no partial result exists.
    TimedOut {
        /// Scheduler generation of the request.
        generation: u64,
        /// The budget that was exceeded.
        budget: Duration,
    },
}

#[derive(Debug, Default)]
struct SchedulerState {
    generation: u64,
    current: Option<CancelToken>,
}

/// Dispatches overlap sweeps to worker threads, one authoritative request at
/// a time.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use photodupe::analysis::{OverlapConfig, OverlapOutcome, OverlapScheduler};
/// use photodupe::model::Catalog;
///
/// let mut catalog = Catalog::new();
/// let index = catalog.index();
///
/// let (scheduler, results) = OverlapScheduler::new();
/// scheduler.submit(Arc::clone(&index), OverlapConfig::default());
///
/// match results.recv().unwrap() {
///     OverlapOutcome::Completed { report, .. } => {
///         println!("{} overlapping pair(s)", report.pairs.len());
///     }
///     OverlapOutcome::TimedOut { budget, .. } => {
///         println!("analysis exceeded {budget:?}, retry with a smaller cap");
///     }
/// }
/// ```
#[derive(Debug)]
pub struct OverlapScheduler {
    state: Arc<Mutex<SchedulerState>>,
    tx: mpsc::Sender<OverlapOutcome>,
}

impl OverlapScheduler {
    /// Create a scheduler and the channel its aggregate outcomes arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<OverlapOutcome>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                state: Arc::new(Mutex::new(SchedulerState::default())),
                tx,
            },
            rx,
        )
    }

    /// Submit an overlap sweep over the given index snapshot.
    ///
    /// The previous in-flight request, if any, is cancelled; its result will
    /// be discarded. The config's token is honoured, so a caller can thread
    /// its own cancellation through. Returns the request generation.
    pub fn submit(&self, index: Arc<DuplicateIndex>, config: OverlapConfig) -> u64 {
        let generation = {
            let mut state = self.state.lock().expect("scheduler state poisoned");
            if let Some(prior) = state.current.take() {
                log::debug!("Superseding in-flight overlap request");
                prior.cancel();
            }
            state.generation += 1;
            state.current = Some(config.cancel.clone());
            state.generation
        };

        let state = Arc::clone(&self.state);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let clusters = complete_duplicates(&index);
            let result = analyze_overlap(&index, &clusters, &config);

            let outcome = match result {
                Ok(report) => OverlapOutcome::Completed { generation, report },
                Err(OverlapError::TimedOut(budget)) => {
                    OverlapOutcome::TimedOut { generation, budget }
                }
                Err(OverlapError::Cancelled) => {
                    log::debug!("Discarding cancelled overlap result (generation {generation})");
                    return;
                }
            };

            // The supersede check and the send stay atomic: `submit` bumps
            // the generation under this same lock, so once a newer request
            // lands, this result can no longer reach the channel.
            let state = state.lock().expect("scheduler state poisoned");
            if state.generation != generation {
                log::debug!("Discarding superseded overlap result (generation {generation})");
                return;
            }
            if tx.send(outcome).is_err() {
                log::debug!("Overlap outcome receiver dropped");
            }
        });

        generation
    }

    /// Cancel the in-flight request, if any.
    pub fn cancel_current(&self) {
        let mut state = self.state.lock().expect("scheduler state poisoned");
        if let Some(token) = state.current.take() {
            token.cancel();
        }
    }
}

impl Drop for OverlapScheduler {
    fn drop(&mut self) {
        self.cancel_current();
    }
}

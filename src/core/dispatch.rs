//! Parallel evaluation of one boundary fit per cell.
//!
//! Cells are independent, so the dispatcher hands each `(cell, points)` pair
//! to a bounded rayon thread pool and collects one [`BoundaryOutcome`] per cell.
//! Each fit runs inside `catch_unwind`, so a panic costs only its own cell and
//! is recorded as [`BoundaryFailure::WorkerFault`].
//!
//! Results are returned in ascending cell order regardless of completion order.

use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use thiserror::Error;

use crate::core::boundary::{BoundaryFailure, BoundaryOutcome};
use crate::core::grouping::{CellGroups, PointSet};
use crate::core::table::CellId;
use crate::core::traits::boundary_fitter::BoundaryFitter;

/// Number of progress reports emitted over a full run.
const PROGRESS_STEPS: usize = 10;

/// Errors raised before any cell is processed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The worker pool could not be created.
    #[error("Failed to build worker pool with {workers} threads: {source}")]
    PoolBuild {
        /// Requested worker count.
        workers: usize,
        /// Underlying rayon error.
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

/// Default worker count: one fewer than the available cores, at least one.
#[must_use]
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .saturating_sub(1)
        .max(1)
}

/// Runs a [`BoundaryFitter`] over every cell on a bounded pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelDispatcher {
    workers: usize,
}

impl Default for ParallelDispatcher {
    fn default() -> Self {
        Self::new(default_worker_count())
    }
}

impl ParallelDispatcher {
    /// Creates a dispatcher with `workers` threads (zero is treated as one).
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Worker thread count.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Fits every group and returns one outcome per cell, in ascending cell order.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PoolBuild`] if the thread pool cannot be created.
    /// Per-cell failures never abort the run; they appear as `Err` outcomes.
    pub fn dispatch<F>(
        &self,
        groups: &CellGroups,
        fitter: &F,
    ) -> Result<Vec<(CellId, BoundaryOutcome)>, DispatchError>
    where
        F: BoundaryFitter + ?Sized,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|index| format!("cellbound-worker-{index}"))
            .build()
            .map_err(|source| DispatchError::PoolBuild {
                workers: self.workers,
                source,
            })?;

        let total = groups.len();
        let report_every = total.div_ceil(PROGRESS_STEPS).max(1);
        let completed = AtomicUsize::new(0);
        tracing::info!(cells = total, workers = self.workers, "fitting cell boundaries");

        let entries: Vec<(&CellId, &PointSet)> = groups.iter().collect();
        let outcomes: Vec<(CellId, BoundaryOutcome)> = pool.install(|| {
            entries
                .into_par_iter()
                .map(|(cell, points)| {
                    let outcome = fit_isolated(fitter, cell, points);
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % report_every == 0 || done == total {
                        tracing::info!(completed = done, total, "progress");
                    }
                    (cell.clone(), outcome)
                })
                .collect()
        });
        Ok(outcomes)
    }
}

/// Runs one fit, converting a panic into a worker fault.
fn fit_isolated<F>(fitter: &F, cell: &CellId, points: &PointSet) -> BoundaryOutcome
where
    F: BoundaryFitter + ?Sized,
{
    catch_unwind(AssertUnwindSafe(|| fitter.fit(cell, points))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::warn!(%cell, %message, "boundary fit panicked");
        Err(BoundaryFailure::WorkerFault { message })
    })
}

// =============================================================================
// TESTS
// =============================================================================

//! End-to-end run: group, fit, assemble, reconcile.
//!
//! ```text
//! TranscriptTable -> group_points -> ParallelDispatcher(BoundaryFitter)
//!                 -> GeometryCollection::assemble -> reconcile -> ReconciledTable
//! ```
//!
//! Per-cell failures never abort a run; only configuration errors and a
//! failure to start the worker pool do.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, KeyEncoding, PipelineConfig};
use crate::core::boundary::{BoundaryBuilder, BoundaryFailure, BoundaryOutcome};
use crate::core::dispatch::{DispatchError, ParallelDispatcher};
use crate::core::geometry_collection::GeometryCollection;
use crate::core::grouping::group_points;
use crate::core::reconcile::{ReconciledTable, reconcile};
use crate::core::table::{CellId, TranscriptTable};
use crate::core::traits::boundary_fitter::BoundaryFitter;
use crate::geometry::algorithms::alpha_shape::FitError;

/// Fatal run errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The alpha-shape fitter rejected its parameter.
    #[error("Cannot create boundary builder: {0}")]
    Fitter(#[from] FitError),
    /// The worker pool could not be started.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Counts describing one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Cells with at least one non-noise transcript.
    pub total_groups: usize,
    /// Cells that received a polygon.
    pub valid: usize,
    /// Cells without a polygon, for any reason.
    pub dropped: usize,
    /// Cells with fewer than three transcripts.
    pub degenerate: usize,
    /// Cells whose fit failed or came out empty.
    pub fitting_failures: usize,
    /// Cells whose computation panicked.
    pub worker_faults: usize,
    /// Distinct non-empty keys in the reconciled table.
    ///
    /// The empty key shared by noise rows is not counted, so after
    /// reconciliation this always equals `valid`.
    pub unique_output_keys: usize,
}

impl RunSummary {
    fn tally(outcomes: &[(CellId, BoundaryOutcome)]) -> Self {
        let mut summary = Self {
            total_groups: outcomes.len(),
            ..Self::default()
        };
        for (cell, outcome) in outcomes {
            match outcome {
                Ok(_) => summary.valid += 1,
                Err(failure) => {
                    summary.dropped += 1;
                    match failure {
                        BoundaryFailure::Degenerate { .. } => summary.degenerate += 1,
                        BoundaryFailure::Fitting(_) | BoundaryFailure::EmptyShape => {
                            summary.fitting_failures += 1;
                        }
                        BoundaryFailure::WorkerFault { .. } => summary.worker_faults += 1,
                    }
                    tracing::debug!(%cell, reason = %failure, "cell dropped");
                }
            }
        }
        summary
    }
}

/// Both artifacts of a run plus its summary.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineOutput {
    /// One polygon per successfully fitted cell.
    pub collection: GeometryCollection,
    /// The input table with rewritten cell and noise columns.
    pub table: ReconciledTable,
    /// Run counts.
    pub summary: RunSummary,
}

/// Runs the full pipeline with the alpha-shape boundary builder.
///
/// # Errors
///
/// Returns a [`PipelineError`] if the configuration is invalid or the worker
/// pool cannot be started.
///
/// # Examples
///
/// ```
/// use cellbound::config::PipelineConfigBuilder;
/// use cellbound::core::table::{CellId, TranscriptTable};
/// use cellbound::geometry::point::Point;
/// use cellbound::pipeline::run;
///
/// let table = TranscriptTable::from_points([
///     (Point::new(0.0, 0.0), Some(CellId::from("A"))),
///     (Point::new(1.0, 0.0), Some(CellId::from("A"))),
///     (Point::new(0.0, 1.0), Some(CellId::from("A"))),
///     (Point::new(9.0, 9.0), Some(CellId::from("B"))),
/// ]);
/// let config = PipelineConfigBuilder::default().workers(1_usize).build().unwrap();
/// let output = run(&table, &config).unwrap();
/// assert_eq!(output.summary.valid, 1);
/// assert_eq!(output.summary.degenerate, 1);
/// assert_eq!(output.table.rows()[0].cell, "prefix-A");
/// ```
pub fn run(
    table: &TranscriptTable,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let builder = BoundaryBuilder::new(config.alpha)?;
    run_with_fitter(table, config, &builder)
}

/// Runs the full pipeline with a caller-supplied fitter.
///
/// # Errors
///
/// Returns a [`PipelineError`] if the configuration is invalid or the worker
/// pool cannot be started.
pub fn run_with_fitter<F>(
    table: &TranscriptTable,
    config: &PipelineConfig,
    fitter: &F,
) -> Result<PipelineOutput, PipelineError>
where
    F: BoundaryFitter + ?Sized,
{
    config.validate()?;

    let encoded;
    let table = match config.key_encoding {
        KeyEncoding::Verbatim => table,
        KeyEncoding::CategoryCodes => {
            let mut copy = table.clone();
            let codes = copy.encode_category_codes();
            tracing::debug!(categories = codes.len(), "encoded cell keys as category codes");
            encoded = copy;
            &encoded
        }
    };

    let groups = group_points(table.rows());
    tracing::info!(
        transcripts = table.len(),
        noise = table.noise_count(),
        cells = groups.len(),
        alpha = config.alpha,
        "grouped transcripts by cell"
    );

    let outcomes = ParallelDispatcher::new(config.workers).dispatch(&groups, fitter)?;
    let collection = GeometryCollection::assemble(&outcomes);
    let reconciled = reconcile(table, &collection, &config.prefix);

    let mut summary = RunSummary::tally(&outcomes);
    summary.unique_output_keys = reconciled.unique_cells().len();
    tracing::info!(
        valid = summary.valid,
        dropped = summary.dropped,
        degenerate = summary.degenerate,
        fitting_failures = summary.fitting_failures,
        worker_faults = summary.worker_faults,
        "run complete"
    );

    Ok(PipelineOutput {
        collection,
        table: reconciled,
        summary,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfigBuilder;
    use crate::core::grouping::PointSet;
    use crate::geometry::point::Point;

    fn config() -> PipelineConfig {
        PipelineConfigBuilder::default().workers(2_usize).build().unwrap()
    }

    fn cluster(cell: &str, x0: f64, count: u32) -> Vec<(Point, Option<CellId>)> {
        (0..count)
            .map(|i| {
                let angle = f64::from(i) * std::f64::consts::TAU / f64::from(count);
                (
                    Point::new(x0 + angle.cos(), angle.sin()),
                    Some(CellId::from(cell)),
                )
            })
            .collect()
    }

    #[test]
    fn invalid_alpha_is_fatal() {
        let table = TranscriptTable::from_points(cluster("A", 0.0, 4));
        let config = PipelineConfigBuilder::default().alpha(-1.0).build().unwrap();
        assert!(matches!(run(&table, &config), Err(PipelineError::Config(_))));
    }

    #[test]
    fn summary_counts_every_failure_kind() {
        let mut rows = cluster("A", 0.0, 6);
        rows.extend(cluster("B", 10.0, 2));
        rows.extend([
            (Point::new(20.0, 0.0), Some(CellId::from("C"))),
            (Point::new(21.0, 0.0), Some(CellId::from("C"))),
            (Point::new(22.0, 0.0), Some(CellId::from("C"))),
        ]);
        rows.push((Point::new(5.0, 5.0), None));
        let table = TranscriptTable::from_points(rows);

        let output = run(&table, &config()).unwrap();
        assert_eq!(
            output.summary,
            RunSummary {
                total_groups: 3,
                valid: 1,
                dropped: 2,
                degenerate: 1,
                fitting_failures: 1,
                worker_faults: 0,
                unique_output_keys: 1,
            }
        );
    }

    #[test]
    fn unique_output_keys_skip_the_noise_key() {
        let mut rows = cluster("A", 0.0, 5);
        rows.extend(cluster("B", 10.0, 5));
        rows.extend(cluster("C", 20.0, 2));
        rows.push((Point::new(5.0, 5.0), None));
        let table = TranscriptTable::from_points(rows);

        let output = run(&table, &config()).unwrap();
        assert!(output.table.rows().iter().any(|row| row.cell.is_empty()));
        assert_eq!(output.summary.unique_output_keys, 2);
        assert_eq!(output.summary.unique_output_keys, output.summary.valid);
    }

    #[test]
    fn category_codes_rename_output_keys() {
        let mut rows = cluster("beta", 0.0, 5);
        rows.extend(cluster("alpha", 10.0, 5));
        let table = TranscriptTable::from_points(rows);
        let config = PipelineConfigBuilder::default()
            .workers(1_usize)
            .key_encoding(KeyEncoding::CategoryCodes)
            .build()
            .unwrap();

        let output = run(&table, &config).unwrap();
        let cells: Vec<CellId> = output.collection.valid_cells().into_iter().collect();
        assert_eq!(cells, vec![CellId::Code(0), CellId::Code(1)]);
        assert_eq!(output.table.rows()[0].cell, "prefix-1");
        assert_eq!(output.table.rows()[5].cell, "prefix-0");
    }

    #[test]
    fn custom_fitter_is_dispatched() {
        let table = TranscriptTable::from_points(cluster("A", 0.0, 5));
        let reject =
            |_: &CellId, _: &PointSet| -> BoundaryOutcome { Err(BoundaryFailure::EmptyShape) };
        let output = run_with_fitter(&table, &config(), &reject).unwrap();
        assert!(output.collection.is_empty());
        assert!(output.table.rows().iter().all(|row| row.is_noise));
        assert_eq!(output.summary.fitting_failures, 1);
    }
}

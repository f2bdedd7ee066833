//! Trait seam between the dispatcher and the per-cell boundary computation.

use crate::core::boundary::BoundaryOutcome;
use crate::core::grouping::PointSet;
use crate::core::table::CellId;

/// Computes the boundary of one cell from its points.
///
/// Implementations must be pure with respect to their inputs: the dispatcher
/// may call [`fit`](Self::fit) for different cells concurrently and in any
/// order. A failure is returned as a value; a panic is caught by the
/// dispatcher and recorded as a worker fault for that cell only.
///
/// [`BoundaryBuilder`](crate::core::boundary::BoundaryBuilder) is the
/// alpha-shape implementation used by the pipeline.
///
/// # Examples
///
/// ```
/// use cellbound::core::boundary::{BoundaryFailure, BoundaryOutcome};
/// use cellbound::core::grouping::PointSet;
/// use cellbound::core::table::CellId;
/// use cellbound::core::traits::BoundaryFitter;
///
/// struct Reject;
///
/// impl BoundaryFitter for Reject {
///     fn fit(&self, _cell: &CellId, _points: &PointSet) -> BoundaryOutcome {
///         Err(BoundaryFailure::EmptyShape)
///     }
/// }
///
/// assert!(Reject.fit(&CellId::Code(0), &PointSet::default()).is_err());
/// ```
pub trait BoundaryFitter: Sync {
    /// Builds the boundary of `cell`.
    fn fit(&self, cell: &CellId, points: &PointSet) -> BoundaryOutcome;
}

impl<F> BoundaryFitter for F
where
    F: Fn(&CellId, &PointSet) -> BoundaryOutcome + Sync,
{
    fn fit(&self, cell: &CellId, points: &PointSet) -> BoundaryOutcome {
        self(cell, points)
    }
}

//! Cell boundary construction: one simple polygon per cell, or a failure.
//!
//! [`BoundaryBuilder::build`] fits an alpha shape to a cell's point set and
//! resolves the candidate to a single exterior ring:
//!
//! 1. A single face is used as is.
//! 2. Several faces are merged with a geometric union.
//! 3. If the union is still multi-part, the part with the largest area wins
//!    and the others are discarded. The count of discarded fragments is kept on
//!    the [`ResolvedPolygon`] for diagnostics only.
//!
//! Every failure is returned as a [`BoundaryFailure`] value; the builder never
//! panics on bad geometry and never retries.

use geo::{Area, BooleanOps};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::grouping::{MIN_POLYGON_POINTS, PointSet};
use crate::core::table::CellId;
use crate::core::traits::boundary_fitter::BoundaryFitter;
use crate::geometry::algorithms::alpha_shape::{AlphaShape, CandidateShape, FitError};
use crate::geometry::point::Point;

// =============================================================================
// OUTCOME TYPES
// =============================================================================

/// Why a cell produced no polygon.
///
/// All variants have the same effect on the output artifacts (the cell is
/// absent); they differ only in diagnostics and in the run summary.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BoundaryFailure {
    /// Fewer than three points.
    #[error("Degenerate cell: {count} points (need at least {MIN_POLYGON_POINTS})")]
    Degenerate {
        /// Number of points in the cell.
        count: usize,
    },
    /// Hull fitting raised an error.
    #[error("Fitting failed: {0}")]
    Fitting(#[from] FitError),
    /// The fit or the union produced no polygon.
    #[error("Fitted shape is empty")]
    EmptyShape,
    /// The computation for this cell panicked inside a worker.
    #[error("Worker fault: {message}")]
    WorkerFault {
        /// Panic payload, when it was a string.
        message: String,
    },
}

/// Final boundary of one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPolygon {
    cell: CellId,
    exterior: Vec<Point>,
    fragments_dropped: usize,
}

impl ResolvedPolygon {
    /// Creates a resolved polygon, closing the ring if needed.
    #[must_use]
    pub fn new(cell: CellId, mut exterior: Vec<Point>, fragments_dropped: usize) -> Self {
        if let (Some(first), Some(last)) = (exterior.first().copied(), exterior.last().copied()) {
            if first != last {
                exterior.push(first);
            }
        }
        Self {
            cell,
            exterior,
            fragments_dropped,
        }
    }

    /// The cell this boundary belongs to.
    #[must_use]
    pub const fn cell(&self) -> &CellId {
        &self.cell
    }

    /// Closed exterior ring (first point equals last).
    #[must_use]
    pub fn exterior(&self) -> &[Point] {
        &self.exterior
    }

    /// Number of smaller disjoint parts discarded during resolution.
    #[must_use]
    pub const fn fragments_dropped(&self) -> usize {
        self.fragments_dropped
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        crate::geometry::util::signed_ring_area(&self.exterior).abs()
    }
}

/// Result of building one cell's boundary.
pub type BoundaryOutcome = Result<ResolvedPolygon, BoundaryFailure>;

// =============================================================================
// RESOLUTION
// =============================================================================

/// A candidate reduced to one exterior ring.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// Closed exterior ring.
    pub exterior: Vec<Point>,
    /// Disjoint parts discarded in favour of the largest one.
    pub fragments_dropped: usize,
}

/// Reduces a candidate shape to a single exterior ring.
///
/// Multi-part candidates are unioned first; if the union is still multi-part,
/// the part with the largest area is kept.
///
/// # Errors
///
/// Returns [`BoundaryFailure::EmptyShape`] when there is no polygon to keep.
pub fn resolve(candidate: CandidateShape) -> Result<Resolution, BoundaryFailure> {
    match candidate {
        CandidateShape::Polygon(polygon) => Ok(Resolution {
            exterior: exterior_ring(&polygon),
            fragments_dropped: 0,
        }),
        CandidateShape::MultiPolygon(parts) => {
            let merged = union_all(parts);
            let part_count = merged.0.len();
            let largest = merged
                .0
                .into_iter()
                .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
                .ok_or(BoundaryFailure::EmptyShape)?;
            Ok(Resolution {
                exterior: exterior_ring(&largest),
                fragments_dropped: part_count - 1,
            })
        }
        CandidateShape::Empty => Err(BoundaryFailure::EmptyShape),
    }
}

/// Unions all parts, merging any that overlap or share boundary.
fn union_all(parts: geo::MultiPolygon<f64>) -> geo::MultiPolygon<f64> {
    let mut polygons = parts.0.into_iter();
    let Some(first) = polygons.next() else {
        return geo::MultiPolygon::new(vec![]);
    };
    polygons.fold(geo::MultiPolygon::new(vec![first]), |merged, polygon| {
        merged.union(&geo::MultiPolygon::new(vec![polygon]))
    })
}

fn exterior_ring(polygon: &geo::Polygon<f64>) -> Vec<Point> {
    polygon.exterior().coords().map(|&c| Point::from(c)).collect()
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builds cell boundaries with a fixed alpha.
///
/// # Examples
///
/// ```
/// use cellbound::core::boundary::{BoundaryBuilder, BoundaryFailure};
/// use cellbound::core::grouping::PointSet;
/// use cellbound::core::table::CellId;
/// use cellbound::geometry::point::Point;
///
/// let builder = BoundaryBuilder::new(0.0).unwrap();
/// let triangle = PointSet::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(2.0, 0.0),
///     Point::new(0.0, 2.0),
/// ]);
/// let polygon = builder.build(&CellId::from("A"), &triangle).unwrap();
/// assert_eq!(polygon.exterior().len(), 4);
/// assert_eq!(polygon.exterior().first(), polygon.exterior().last());
///
/// let pair = PointSet::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
/// assert_eq!(
///     builder.build(&CellId::from("B"), &pair),
///     Err(BoundaryFailure::Degenerate { count: 2 })
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryBuilder {
    shape: AlphaShape,
}

impl BoundaryBuilder {
    /// Creates a builder for `alpha`.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidAlpha`] if `alpha` is negative, NaN or infinite.
    pub fn new(alpha: f64) -> Result<Self, FitError> {
        Ok(Self {
            shape: AlphaShape::new(alpha)?,
        })
    }

    /// The shape parameter.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.shape.alpha()
    }

    /// Builds the boundary of `cell` from its points.
    ///
    /// # Errors
    ///
    /// Returns a [`BoundaryFailure`] when the cell has fewer than three points,
    /// the fit fails, or the fitted shape is empty.
    pub fn build(&self, cell: &CellId, points: &PointSet) -> BoundaryOutcome {
        if points.is_degenerate() {
            return Err(BoundaryFailure::Degenerate {
                count: points.len(),
            });
        }

        let candidate = self.shape.fit(points.points())?;
        let parts = candidate.part_count();
        let resolution = resolve(candidate)?;

        if resolution.fragments_dropped > 0 {
            tracing::debug!(
                %cell,
                parts,
                dropped = resolution.fragments_dropped,
                "kept largest component of multi-part shape"
            );
        }
        Ok(ResolvedPolygon::new(
            cell.clone(),
            resolution.exterior,
            resolution.fragments_dropped,
        ))
    }
}

impl BoundaryFitter for BoundaryBuilder {
    fn fit(&self, cell: &CellId, points: &PointSet) -> BoundaryOutcome {
        self.build(cell, points)
    }
}

// =============================================================================
// TESTS
// =============================================================================

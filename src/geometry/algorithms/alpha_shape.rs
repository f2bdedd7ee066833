//! Alpha shapes (concave hulls) of planar point sets.
//!
//! # Construction
//!
//! For `alpha > 0` and at least four points:
//!
//! 1. Build the Delaunay [`Triangulation`] of the distinct points.
//! 2. Keep each triangle whose circumradius is strictly below `1 / alpha`.
//! 3. Polygonize: collect the edges used by exactly one kept triangle, orient
//!    them counter-clockwise around the kept region, and trace them into closed
//!    loops. At a vertex with several outgoing boundary edges the trace takes
//!    the first edge clockwise from the incoming one, so regions that only
//!    touch at a vertex come out as separate loops.
//! 4. Every counter-clockwise loop is one face; clockwise loops bound holes and
//!    are filled.
//!
//! For `alpha == 0`, or for fewer than four points, the shape is the convex hull.
//!
//! Larger `alpha` gives a tighter boundary and more chances of splitting into
//! several faces; a very large `alpha` keeps no triangle at all and yields
//! [`CandidateShape::Empty`].

use std::f64::consts::TAU;

use thiserror::Error;

use crate::core::collections::{
    DirectedEdge, FastHashMap, FastHashSet, SmallBuffer, edge_key, fast_hash_map_with_capacity,
};
use crate::core::triangulation::{Triangle, Triangulation, TriangulationError};
use crate::geometry::algorithms::convex_hull::{ConvexHull, ConvexHullError};
use crate::geometry::point::Point;
use crate::geometry::util::{circumradius, signed_ring_area};

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while fitting an alpha shape.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FitError {
    /// The shape parameter is negative, NaN or infinite.
    #[error("Invalid alpha {alpha}: must be finite and non-negative")]
    InvalidAlpha {
        /// The rejected value.
        alpha: f64,
    },
    /// Convex hull construction failed (alpha == 0 or fewer than four points).
    #[error("Convex hull fit failed: {0}")]
    ConvexHull(#[from] ConvexHullError),
    /// Delaunay triangulation failed.
    #[error("Triangulation failed: {0}")]
    Triangulation(#[from] TriangulationError),
    /// Boundary tracing met an edge configuration it cannot close into a loop.
    #[error("Boundary tracing failed: {message}")]
    BoundaryTracing {
        /// Description of the broken configuration.
        message: String,
    },
}

// =============================================================================
// CANDIDATE SHAPE
// =============================================================================

/// Raw output of the alpha-shape fit, before multi-part resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum CandidateShape {
    /// A single face.
    Polygon(geo::Polygon<f64>),
    /// Two or more faces, possibly touching or nested.
    MultiPolygon(geo::MultiPolygon<f64>),
    /// No triangle survived the circumradius filter.
    Empty,
}

impl CandidateShape {
    fn from_faces(mut faces: Vec<geo::Polygon<f64>>) -> Self {
        match faces.len() {
            0 => Self::Empty,
            1 => faces.pop().map_or(Self::Empty, Self::Polygon),
            _ => Self::MultiPolygon(geo::MultiPolygon::new(faces)),
        }
    }

    /// Number of faces in the candidate.
    #[must_use]
    pub fn part_count(&self) -> usize {
        match self {
            Self::Polygon(_) => 1,
            Self::MultiPolygon(multi) => multi.0.len(),
            Self::Empty => 0,
        }
    }
}

// =============================================================================
// ALPHA SHAPE
// =============================================================================

/// Alpha-shape fitter for a fixed shape parameter.
///
/// # Examples
///
/// ```
/// use cellbound::geometry::algorithms::alpha_shape::{AlphaShape, CandidateShape};
/// use cellbound::geometry::point::Point;
///
/// let points = [
///     Point::new(0.0, 0.0),
///     Point::new(4.0, 0.0),
///     Point::new(4.0, 4.0),
///     Point::new(0.0, 4.0),
///     Point::new(2.0, 2.0),
/// ];
/// let shape = AlphaShape::new(0.1).unwrap().fit(&points).unwrap();
/// assert!(matches!(shape, CandidateShape::Polygon(_)));
///
/// // Every triangle here has circumradius 2, so alpha = 1 keeps none.
/// let empty = AlphaShape::new(1.0).unwrap().fit(&points).unwrap();
/// assert_eq!(empty, CandidateShape::Empty);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlphaShape {
    alpha: f64,
}

impl AlphaShape {
    /// Creates a fitter for `alpha`.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InvalidAlpha`] if `alpha` is negative, NaN or infinite.
    pub fn new(alpha: f64) -> Result<Self, FitError> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(FitError::InvalidAlpha { alpha });
        }
        Ok(Self { alpha })
    }

    /// The shape parameter.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Whether fitting `point_count` points degenerates to the convex hull.
    #[must_use]
    pub fn uses_convex_hull(&self, point_count: usize) -> bool {
        self.alpha <= 0.0 || point_count < 4
    }

    /// Fits the alpha shape of `points`.
    ///
    /// # Errors
    ///
    /// Returns a [`FitError`] when the hull or the triangulation cannot be
    /// built (too few distinct points, collinear input) or when boundary
    /// tracing fails.
    pub fn fit(&self, points: &[Point]) -> Result<CandidateShape, FitError> {
        if self.uses_convex_hull(points.len()) {
            let hull = ConvexHull::from_points(points)?;
            return Ok(CandidateShape::Polygon(hull.to_polygon()));
        }

        let triangulation = Triangulation::new(points)?;
        let radius_limit = 1.0 / self.alpha;
        let kept: Vec<&Triangle> = triangulation
            .triangles()
            .map(|(_, triangle)| triangle)
            .filter(|triangle| {
                let [a, b, c] = triangulation.triangle_points(triangle);
                circumradius(&a, &b, &c).is_some_and(|r| r < radius_limit)
            })
            .collect();

        let stats = triangulation.statistics();
        tracing::trace!(
            alpha = self.alpha,
            vertices = stats.vertices_processed,
            hull_extensions = stats.hull_extensions,
            carved = stats.triangles_removed,
            triangles = triangulation.number_of_triangles(),
            kept = kept.len(),
            "filtered triangles by circumradius"
        );

        let faces = polygonize(triangulation.points(), &kept)?;
        Ok(CandidateShape::from_faces(faces))
    }
}

// =============================================================================
// BOUNDARY TRACING
// =============================================================================

/// Traces the boundary of the union of `triangles` into filled faces.
fn polygonize(
    points: &[Point],
    triangles: &[&Triangle],
) -> Result<Vec<geo::Polygon<f64>>, FitError> {
    let mut edge_use: FastHashMap<(usize, usize), usize> =
        fast_hash_map_with_capacity(triangles.len() * 3);
    for triangle in triangles {
        for (a, b) in triangle.directed_edges() {
            *edge_use.entry(edge_key(a, b)).or_insert(0) += 1;
        }
    }

    let mut boundary: Vec<DirectedEdge> = triangles
        .iter()
        .flat_map(|triangle| triangle.directed_edges())
        .filter(|&(a, b)| edge_use.get(&edge_key(a, b)) == Some(&1))
        .collect();
    boundary.sort_unstable();

    let mut outgoing: FastHashMap<usize, SmallBuffer<usize, 2>> = FastHashMap::default();
    for &(a, b) in &boundary {
        outgoing.entry(a).or_default().push(b);
    }

    let mut visited: FastHashSet<DirectedEdge> = FastHashSet::default();
    let mut faces = Vec::new();
    for &start in &boundary {
        if visited.contains(&start) {
            continue;
        }
        let ring = trace_loop(points, &outgoing, &mut visited, start)?;
        let ring_points: Vec<Point> = ring.iter().map(|&i| points[i]).collect();
        if signed_ring_area(&ring_points) > 0.0 {
            let exterior: Vec<geo::Coord<f64>> = ring_points.into_iter().map(Into::into).collect();
            faces.push(geo::Polygon::new(geo::LineString::new(exterior), vec![]));
        }
    }
    Ok(faces)
}

/// Follows boundary edges from `start` until the loop closes, returning its vertex indices.
fn trace_loop(
    points: &[Point],
    outgoing: &FastHashMap<usize, SmallBuffer<usize, 2>>,
    visited: &mut FastHashSet<DirectedEdge>,
    start: DirectedEdge,
) -> Result<Vec<usize>, FitError> {
    let mut ring = vec![start.0];
    let mut edge = start;
    visited.insert(edge);

    loop {
        let (from, at) = edge;
        let candidates = outgoing.get(&at).ok_or_else(|| FitError::BoundaryTracing {
            message: format!("vertex {at} has no outgoing boundary edge"),
        })?;
        let next = next_boundary_vertex(points, from, at, candidates);
        let next_edge = (at, next);
        if next_edge == start {
            return Ok(ring);
        }
        if !visited.insert(next_edge) {
            return Err(FitError::BoundaryTracing {
                message: format!("edge {at} -> {next} revisited before the loop closed"),
            });
        }
        ring.push(at);
        edge = next_edge;
    }
}

/// Picks the outgoing edge at `at` reached first when turning clockwise from the
/// direction back towards `from`. This keeps the trace inside one interior wedge.
fn next_boundary_vertex(points: &[Point], from: usize, at: usize, candidates: &[usize]) -> usize {
    if let [only] = candidates {
        return *only;
    }
    let origin = points[at];
    let back = (points[from].x() - origin.x(), points[from].y() - origin.y());
    let clockwise_angle = |to: usize| {
        let out = (points[to].x() - origin.x(), points[to].y() - origin.y());
        let cross = back.0.mul_add(out.1, -(back.1 * out.0));
        let dot = back.0.mul_add(out.0, back.1 * out.1);
        let ccw = cross.atan2(dot).rem_euclid(TAU);
        let cw = TAU - ccw;
        if cw <= 0.0 { TAU } else { cw }
    };
    candidates
        .iter()
        .copied()
        .min_by(|&a, &b| clockwise_angle(a).total_cmp(&clockwise_angle(b)))
        .unwrap_or(candidates[0])
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::Area;

    fn square_with_centre(x0: f64, y0: f64, side: f64) -> Vec<Point> {
        let h = side / 2.0;
        vec![
            Point::new(x0, y0),
            Point::new(x0 + side, y0),
            Point::new(x0 + side, y0 + side),
            Point::new(x0, y0 + side),
            Point::new(x0 + h, y0 + h),
        ]
    }

    fn candidate_area(shape: &CandidateShape) -> f64 {
        match shape {
            CandidateShape::Polygon(p) => p.unsigned_area(),
            CandidateShape::MultiPolygon(m) => m.unsigned_area(),
            CandidateShape::Empty => 0.0,
        }
    }

    #[test]
    fn invalid_alpha_is_rejected() {
        assert!(AlphaShape::new(-0.5).is_err());
        assert!(AlphaShape::new(f64::NAN).is_err());
        assert!(AlphaShape::new(f64::INFINITY).is_err());
        assert!(AlphaShape::new(0.0).is_ok());
    }

    #[test]
    fn zero_alpha_is_convex_hull() {
        let mut points = square_with_centre(0.0, 0.0, 4.0);
        points.push(Point::new(2.0, 0.5)); // makes the point set non-convex for small radii
        let shape = AlphaShape::new(0.0).unwrap().fit(&points).unwrap();
        assert!(matches!(shape, CandidateShape::Polygon(_)));
        assert_relative_eq!(candidate_area(&shape), 16.0, epsilon = 1e-9);
    }

    #[test]
    fn three_points_always_use_convex_hull() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(0.0, 100.0),
        ];
        // A tiny radius limit would reject this triangle, but the hull path ignores alpha.
        let shape = AlphaShape::new(10.0).unwrap().fit(&points).unwrap();
        assert_relative_eq!(candidate_area(&shape), 5000.0, epsilon = 1e-9);
    }

    #[test]
    fn collinear_points_fail_to_fit() {
        let points: Vec<Point> = (0..5).map(|i| Point::new(f64::from(i), 1.0)).collect();
        assert!(matches!(
            AlphaShape::new(0.0).unwrap().fit(&points),
            Err(FitError::ConvexHull(ConvexHullError::GeometricDegeneracy { .. }))
        ));
        assert!(matches!(
            AlphaShape::new(0.5).unwrap().fit(&points),
            Err(FitError::Triangulation(TriangulationError::GeometricDegeneracy { .. }))
        ));
    }

    #[test]
    fn separated_clusters_become_multipolygon() {
        let mut points = square_with_centre(0.0, 0.0, 4.0);
        points.extend(square_with_centre(100.0, 0.0, 2.0));
        let shape = AlphaShape::new(0.1).unwrap().fit(&points).unwrap();
        assert_eq!(shape.part_count(), 2);
        assert_relative_eq!(candidate_area(&shape), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn concave_notch_is_carved_out() {
        // A 6x2 bar with a 2x2 block on each end on top: a "U" shape.
        let mut points = Vec::new();
        for i in 0..=6 {
            for j in 0..=2 {
                points.push(Point::new(f64::from(i), f64::from(j)));
            }
        }
        for i in [0, 1, 5, 6] {
            for j in 3..=4 {
                points.push(Point::new(f64::from(i), f64::from(j)));
            }
        }
        let shape = AlphaShape::new(1.0).unwrap().fit(&points).unwrap();
        assert!(matches!(shape, CandidateShape::Polygon(_)));
        // Bar (6x2) plus two 1x2 uprights is 16; the convex hull is 24. Only the
        // small corner triangles next to the uprights may fill the gap.
        let area = candidate_area(&shape);
        assert!(area >= 16.0 - 1e-9, "area {area}");
        assert!(area < 20.0, "area {area}");
    }

    #[test]
    fn triangles_touching_at_a_vertex_trace_separately() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
        ];
        let t1 = Triangle::new([0, 1, 2]);
        let t2 = Triangle::new([0, 3, 4]);
        let faces = polygonize(&points, &[&t1, &t2]).unwrap();
        assert_eq!(faces.len(), 2);
        for face in &faces {
            assert_relative_eq!(face.unsigned_area(), 1.0, epsilon = 1e-12);
            assert_eq!(face.exterior().0.len(), 4);
        }
    }

    #[test]
    fn ring_of_triangles_fills_its_hole() {
        // Eight triangles around a square hole of side 1 centred at the origin.
        let points = [
            Point::new(-1.5, -1.5),
            Point::new(1.5, -1.5),
            Point::new(1.5, 1.5),
            Point::new(-1.5, 1.5),
            Point::new(-0.5, -0.5),
            Point::new(0.5, -0.5),
            Point::new(0.5, 0.5),
            Point::new(-0.5, 0.5),
        ];
        let triangles = [
            Triangle::new([0, 1, 5]),
            Triangle::new([0, 5, 4]),
            Triangle::new([1, 2, 6]),
            Triangle::new([1, 6, 5]),
            Triangle::new([2, 3, 7]),
            Triangle::new([2, 7, 6]),
            Triangle::new([3, 0, 4]),
            Triangle::new([3, 4, 7]),
        ];
        let refs: Vec<&Triangle> = triangles.iter().collect();
        let faces = polygonize(&points, &refs).unwrap();
        assert_eq!(faces.len(), 1);
        assert_relative_eq!(faces[0].unsigned_area(), 9.0, epsilon = 1e-12);
    }
}

//! Planar convex hulls.
//!
//! The hull is computed with Andrew's monotone chain over the lexicographically
//! sorted, deduplicated input. Turns are classified with the tolerant
//! [`orientation`] predicate, so collinear boundary points are dropped and the
//! resulting ring is strictly convex and counter-clockwise.
//!
//! This is the shape fitted for `alpha == 0` and for point sets too small to
//! triangulate meaningfully (see [`crate::geometry::algorithms::alpha_shape`]).

use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, orientation};
use crate::geometry::util::{dedup_points_exact, signed_ring_area};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during convex hull construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConvexHullError {
    /// Insufficient data to construct a convex hull.
    #[error("Insufficient data for convex hull construction: {message}")]
    InsufficientData {
        /// Description of the data insufficiency.
        message: String,
    },
    /// The points do not span an area (all coincident or collinear).
    #[error("Geometric degeneracy encountered during convex hull construction: {message}")]
    GeometricDegeneracy {
        /// Description of the degeneracy issue.
        message: String,
    },
}

// =============================================================================
// CONVEX HULL
// =============================================================================

/// Convex hull of a planar point set.
///
/// Vertices are stored counter-clockwise without the closing point, starting at
/// the lexicographically smallest point.
///
/// # Examples
///
/// ```
/// use cellbound::geometry::algorithms::convex_hull::ConvexHull;
/// use cellbound::geometry::point::Point;
///
/// let points = [
///     Point::new(0.0, 0.0),
///     Point::new(2.0, 0.0),
///     Point::new(1.0, 1.0), // interior
///     Point::new(2.0, 2.0),
///     Point::new(0.0, 2.0),
///     Point::new(1.0, 0.0), // collinear on the boundary
/// ];
/// let hull = ConvexHull::from_points(&points).unwrap();
/// assert_eq!(hull.vertices().len(), 4);
/// assert!((hull.area() - 4.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHull {
    vertices: Vec<Point>,
}

impl ConvexHull {
    /// Builds the convex hull of `points`.
    ///
    /// # Errors
    ///
    /// - [`ConvexHullError::InsufficientData`] for fewer than three distinct points.
    /// - [`ConvexHullError::GeometricDegeneracy`] when all points are collinear.
    pub fn from_points(points: &[Point]) -> Result<Self, ConvexHullError> {
        let mut sorted = dedup_points_exact(points);
        if sorted.len() < 3 {
            return Err(ConvexHullError::InsufficientData {
                message: format!(
                    "need at least 3 distinct points, got {} ({} total)",
                    sorted.len(),
                    points.len()
                ),
            });
        }
        sorted.sort_unstable();

        let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
        for p in &sorted {
            push_convex(&mut lower, *p);
        }
        let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
        for p in sorted.iter().rev() {
            push_convex(&mut upper, *p);
        }

        // Each chain ends with the first point of the other one.
        lower.pop();
        upper.pop();
        lower.extend(upper);

        if lower.len() < 3 {
            return Err(ConvexHullError::GeometricDegeneracy {
                message: format!("{} distinct points are collinear", sorted.len()),
            });
        }
        Ok(Self { vertices: lower })
    }

    /// Hull vertices, counter-clockwise, without the closing point.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_ring_area(&self.vertices)
    }

    /// Closed exterior ring (first point repeated at the end).
    #[must_use]
    pub fn closed_ring(&self) -> Vec<Point> {
        let mut ring = self.vertices.clone();
        ring.extend(self.vertices.first().copied());
        ring
    }

    /// The hull as a `geo` polygon without holes.
    #[must_use]
    pub fn to_polygon(&self) -> geo::Polygon<f64> {
        let exterior: Vec<geo::Coord<f64>> = self.vertices.iter().map(|&p| p.into()).collect();
        geo::Polygon::new(geo::LineString::new(exterior), vec![])
    }
}

/// Pushes `p` onto a monotone chain, popping points that do not make a strict left turn.
fn push_convex(chain: &mut Vec<Point>, p: Point) {
    while chain.len() >= 2
        && orientation(&chain[chain.len() - 2], &chain[chain.len() - 1], &p)
            != Orientation::POSITIVE
    {
        chain.pop();
    }
    chain.push(p);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::Area;

    #[test]
    fn hull_of_triangle_is_ccw() {
        let hull = ConvexHull::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(0.0, 3.0),
            Point::new(4.0, 0.0),
        ])
        .unwrap();
        assert_eq!(
            hull.vertices(),
            &[
                Point::new(0.0, 0.0),
                Point::new(4.0, 0.0),
                Point::new(0.0, 3.0)
            ]
        );
        assert_relative_eq!(hull.area(), 6.0);
    }

    #[test]
    fn closed_ring_repeats_first_point() {
        let hull = ConvexHull::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ])
        .unwrap();
        let ring = hull.closed_ring();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn duplicates_do_not_count_as_distinct_points() {
        let err = ConvexHull::from_points(&[
            Point::new(1.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ConvexHullError::InsufficientData { .. }));
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let points: Vec<Point> = (0..6)
            .map(|i| Point::new(f64::from(i), 2.0 * f64::from(i)))
            .collect();
        let err = ConvexHull::from_points(&points).unwrap_err();
        assert!(matches!(err, ConvexHullError::GeometricDegeneracy { .. }));
    }

    #[test]
    fn polygon_conversion_matches_hull_area() {
        let hull = ConvexHull::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 3.0),
            Point::new(0.0, 3.0),
            Point::new(1.5, 1.5),
        ])
        .unwrap();
        assert_relative_eq!(hull.to_polygon().unsigned_area(), hull.area(), epsilon = 1e-12);
    }
}

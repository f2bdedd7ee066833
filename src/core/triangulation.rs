//! Planar Delaunay triangulation of a point set.
//!
//! [`Triangulation`] owns the distinct input points and a slot map of
//! counter-clockwise [`Triangle`]s indexing into them. Construction goes through
//! [`IncrementalBowyerWatson`](crate::core::algorithms::bowyer_watson::IncrementalBowyerWatson).
//!
//! # Invariants
//!
//! - Every triangle is counter-clockwise (non-negative signed area).
//! - Every triangle references three distinct indices into [`Triangulation::points`].
//! - No point lies strictly inside the circumcircle of any triangle
//!   (checked by [`Triangulation::is_delaunay`]).
//! - Each undirected edge is shared by at most two triangles.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

use crate::core::algorithms::bowyer_watson::{IncrementalBowyerWatson, InsertionStatistics};
use crate::core::collections::StorageMap;
use crate::geometry::point::{CoordinateValidationError, Point};
use crate::geometry::predicates::{InCircle, incircle};
use crate::geometry::util::dedup_points_exact;

new_key_type! {
    /// Key type for accessing triangles in the storage map.
    pub struct TriangleKey;
}

/// Errors that can occur while triangulating a point set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TriangulationError {
    /// Fewer distinct points than a single triangle needs.
    #[error("Insufficient vertices for triangulation: {count} distinct points (need at least 3)")]
    InsufficientVertices {
        /// Number of distinct input points.
        count: usize,
    },
    /// The points do not span the plane (all collinear), or insertion hit an
    /// unrecoverable degenerate configuration.
    #[error("Geometric degeneracy: {message}")]
    GeometricDegeneracy {
        /// Description of the degeneracy.
        message: String,
    },
    /// An input coordinate is NaN or infinite.
    #[error(transparent)]
    InvalidCoordinate(#[from] CoordinateValidationError),
}

/// A triangle given by three vertex indices in counter-clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    vertices: [usize; 3],
}

impl Triangle {
    /// Creates a triangle from counter-clockwise vertex indices.
    #[must_use]
    pub const fn new(vertices: [usize; 3]) -> Self {
        Self { vertices }
    }

    /// Vertex indices, counter-clockwise.
    #[must_use]
    pub const fn vertices(&self) -> [usize; 3] {
        self.vertices
    }

    /// The three directed edges `(v0, v1)`, `(v1, v2)`, `(v2, v0)`.
    #[must_use]
    pub const fn directed_edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }

    /// Whether `index` is one of this triangle's vertices.
    #[must_use]
    pub fn contains_vertex(&self, index: usize) -> bool {
        self.vertices.contains(&index)
    }
}

/// Delaunay triangulation of a planar point set.
///
/// # Examples
///
/// ```
/// use cellbound::core::triangulation::Triangulation;
/// use cellbound::geometry::point::Point;
///
/// let points = [
///     Point::new(0.0, 0.0),
///     Point::new(4.0, 0.0),
///     Point::new(4.0, 4.0),
///     Point::new(0.0, 4.0),
///     Point::new(2.0, 2.0),
/// ];
/// let tri = Triangulation::new(&points).unwrap();
/// assert_eq!(tri.number_of_vertices(), 5);
/// assert_eq!(tri.number_of_triangles(), 4);
/// assert!(tri.is_delaunay());
/// ```
#[derive(Clone, Debug)]
pub struct Triangulation {
    points: Vec<Point>,
    triangles: StorageMap<TriangleKey, Triangle>,
    statistics: InsertionStatistics,
}

impl Triangulation {
    /// Triangulates `points`. Exact duplicate points are merged first.
    ///
    /// # Errors
    ///
    /// - [`TriangulationError::InvalidCoordinate`] for NaN or infinite coordinates.
    /// - [`TriangulationError::InsufficientVertices`] for fewer than 3 distinct points.
    /// - [`TriangulationError::GeometricDegeneracy`] when all points are collinear.
    pub fn new(points: &[Point]) -> Result<Self, TriangulationError> {
        for point in points {
            point.validate()?;
        }
        let points = dedup_points_exact(points);
        let mut algorithm = IncrementalBowyerWatson::new();
        let triangles = algorithm.triangulate(&points)?;
        Ok(Self {
            points,
            triangles,
            statistics: *algorithm.statistics(),
        })
    }

    /// The distinct points, indexed by triangle vertex indices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of distinct vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Iterates over `(key, triangle)` pairs.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleKey, &Triangle)> {
        self.triangles.iter()
    }

    /// Coordinates of a triangle's vertices, counter-clockwise.
    #[must_use]
    pub fn triangle_points(&self, triangle: &Triangle) -> [Point; 3] {
        triangle.vertices().map(|i| self.points[i])
    }

    /// Counters from the construction of this triangulation.
    #[must_use]
    pub const fn statistics(&self) -> &InsertionStatistics {
        &self.statistics
    }

    /// Checks the empty-circumcircle property for every triangle.
    ///
    /// This is an O(n * t) scan intended for validation and tests.
    #[must_use]
    pub fn is_delaunay(&self) -> bool {
        self.triangles.values().all(|triangle| {
            let [a, b, c] = self.triangle_points(triangle);
            self.points
                .iter()
                .enumerate()
                .filter(|(i, _)| !triangle.contains_vertex(*i))
                .all(|(_, p)| incircle(&a, &b, &c, p) != InCircle::INSIDE)
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

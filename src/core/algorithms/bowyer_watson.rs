//! Incremental Bowyer-Watson algorithm for planar Delaunay triangulation.
//!
//! This implementation works directly on the input points without a
//! super-triangle, so every triangle of the result is a real Delaunay triangle
//! and their union is exactly the convex hull.
//!
//! # Algorithm Overview
//!
//! 1. **Initialization**: Pick a seed triangle from the first three points that
//!    are not collinear, oriented counter-clockwise.
//! 2. **Incremental insertion**: For each remaining point:
//!    - If the point lies outside the current hull, collect the hull edges it
//!      can see (strictly, or by lying on the open edge); otherwise locate the
//!      triangle containing it
//!    - Starting there, collect the connected *bad* triangles whose
//!      circumcircle strictly contains the point
//!    - Remove the bad triangles and connect every edge on the boundary of the
//!      cavity, visible hull edges included, to the new point
//!
//! A visible hull edge `(a, b)` behaves like a triangle with a vertex at
//! infinity: its conflict region is the open half-plane beyond the edge plus the
//! open edge itself. Cavity edges that would reach infinity are dropped, which
//! leaves the new point on the hull.
//!
//! Points on a circumcircle (`InCircle::BOUNDARY`) do not conflict, which keeps
//! the cavity star-shaped for cocircular input such as regular grids.
//!
//! The conflict search is a linear scan over live triangles, so construction is
//! O(n²) in the worst case. Per-cell transcript clouds are small enough that this
//! never dominates a run.
//!
//! # References
//!
//! - **Bowyer, A.** "Computing Dirichlet tessellations." *The Computer Journal* 24.2 (1981): 162-166.
//!   DOI: [10.1093/comjnl/24.2.162](https://doi.org/10.1093/comjnl/24.2.162)
//!
//! - **Watson, D.F.** "Computing the n-dimensional Delaunay tessellation with application to
//!   Voronoi polytopes." *The Computer Journal* 24.2 (1981): 167-172.
//!   DOI: [10.1093/comjnl/24.2.167](https://doi.org/10.1093/comjnl/24.2.167)
//!
//! - **Shewchuk, J.R.** "Lecture Notes on Delaunay Mesh Generation." UC Berkeley, 2012.
//!   Section 3.4: ghost triangles.

use crate::core::collections::{DirectedEdge, FastHashMap, FastHashSet, StorageMap};
use crate::core::triangulation::{Triangle, TriangleKey, TriangulationError};
use crate::geometry::point::Point;
use crate::geometry::predicates::{InCircle, Orientation, incircle, orientation};

/// Counters describing one triangulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertionStatistics {
    /// Points inserted, seed triangle included.
    pub vertices_processed: usize,
    /// Triangles created, including ones later removed.
    pub triangles_created: usize,
    /// Triangles removed by cavity carving.
    pub triangles_removed: usize,
    /// Insertions that extended the convex hull.
    pub hull_extensions: usize,
}

/// Incremental Bowyer-Watson algorithm implementation.
///
/// Holds only statistics; every call to [`triangulate`](Self::triangulate)
/// works on fresh storage.
#[derive(Clone, Debug, Default)]
pub struct IncrementalBowyerWatson {
    stats: InsertionStatistics,
}

impl IncrementalBowyerWatson {
    /// Creates an algorithm instance with zeroed statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics of the most recent run.
    #[must_use]
    pub const fn statistics(&self) -> &InsertionStatistics {
        &self.stats
    }

    /// Triangulates distinct, finite `points`.
    ///
    /// Triangle vertex indices refer to positions in `points`.
    ///
    /// # Errors
    ///
    /// - [`TriangulationError::InsufficientVertices`] for fewer than 3 points.
    /// - [`TriangulationError::GeometricDegeneracy`] when the points are collinear
    ///   or an insertion produces an inverted triangle.
    pub fn triangulate(
        &mut self,
        points: &[Point],
    ) -> Result<StorageMap<TriangleKey, Triangle>, TriangulationError> {
        self.stats = InsertionStatistics::default();

        if points.len() < 3 {
            return Err(TriangulationError::InsufficientVertices {
                count: points.len(),
            });
        }
        let seed =
            seed_triangle(points).ok_or_else(|| TriangulationError::GeometricDegeneracy {
                message: format!("all {} points are collinear", points.len()),
            })?;

        let mut triangles: StorageMap<TriangleKey, Triangle> = StorageMap::with_key();
        triangles.insert(Triangle::new(seed));
        self.stats.triangles_created += 1;
        self.stats.vertices_processed += 3;

        for index in (0..points.len()).filter(|i| !seed.contains(i)) {
            self.insert_vertex(points, &mut triangles, index)?;
            self.stats.vertices_processed += 1;
        }
        Ok(triangles)
    }

    fn insert_vertex(
        &mut self,
        points: &[Point],
        triangles: &mut StorageMap<TriangleKey, Triangle>,
        index: usize,
    ) -> Result<(), TriangulationError> {
        let point = &points[index];

        // Triangles that must be carved regardless of the in-circle test, and
        // triangles from which the conflict search starts.
        let mut forced: Vec<TriangleKey> = Vec::new();
        let mut starts: Vec<TriangleKey> = Vec::new();
        let mut visible: Vec<DirectedEdge> = Vec::new();
        for (edge, owner) in hull_edges(triangles) {
            match edge_visibility(points, edge, point) {
                EdgeVisibility::Beyond => {
                    visible.push(edge);
                    starts.push(owner);
                }
                EdgeVisibility::OnEdge => {
                    visible.push(edge);
                    forced.push(owner);
                }
                EdgeVisibility::Hidden => {}
            }
        }

        if visible.is_empty() {
            let containing = triangles
                .iter()
                .find(|(_, triangle)| {
                    let [a, b, c] = triangle.vertices().map(|i| points[i]);
                    [(a, b), (b, c), (c, a)]
                        .iter()
                        .all(|(p, q)| orientation(p, q, point) != Orientation::NEGATIVE)
                })
                .map(|(key, _)| key)
                .ok_or_else(|| TriangulationError::GeometricDegeneracy {
                    message: format!("point {index} is neither inside nor outside the hull"),
                })?;
            // A point within tolerance of every circumcircle still lies in
            // this triangle; carve it so the vertex is not lost.
            forced.push(containing);
        } else {
            self.stats.hull_extensions += 1;
        }

        let bad = conflict_region(points, triangles, point, &forced, &starts);

        let mut cavity_edges: FastHashSet<DirectedEdge> = bad
            .iter()
            .filter_map(|key| triangles.get(*key))
            .flat_map(Triangle::directed_edges)
            .collect();
        cavity_edges.extend(visible.iter().map(|&(a, b)| (b, a)));
        let boundary: Vec<DirectedEdge> = cavity_edges
            .iter()
            .filter(|(a, b)| !cavity_edges.contains(&(*b, *a)))
            .copied()
            .collect();

        for key in &bad {
            triangles.remove(*key);
        }
        self.stats.triangles_removed += bad.len();

        for (a, b) in boundary {
            if orientation(&points[a], &points[b], point) == Orientation::NEGATIVE {
                return Err(TriangulationError::GeometricDegeneracy {
                    message: format!("cavity for point {index} is not star-shaped"),
                });
            }
            triangles.insert(Triangle::new([a, b, index]));
            self.stats.triangles_created += 1;
        }
        Ok(())
    }
}

/// Collects the triangles whose circumcircle strictly contains `point`,
/// searching outward across shared edges.
///
/// `forced` triangles always conflict; `starts` are only tested. Conflicting
/// triangles unreachable from either are left alone, which keeps the cavity
/// connected when rounding misjudges a distant, nearly cocircular triangle.
fn conflict_region(
    points: &[Point],
    triangles: &StorageMap<TriangleKey, Triangle>,
    point: &Point,
    forced: &[TriangleKey],
    starts: &[TriangleKey],
) -> Vec<TriangleKey> {
    let across: FastHashMap<DirectedEdge, TriangleKey> = triangles
        .iter()
        .flat_map(|(key, triangle)| triangle.directed_edges().map(|edge| (edge, key)))
        .collect();
    let conflicts = |key: TriangleKey| {
        triangles.get(key).is_some_and(|triangle| {
            let [a, b, c] = triangle.vertices().map(|i| points[i]);
            incircle(&a, &b, &c, point) == InCircle::INSIDE
        })
    };

    let mut region = Vec::new();
    let mut visited: FastHashSet<TriangleKey> = FastHashSet::default();
    let mut queue: Vec<TriangleKey> = forced.to_vec();
    queue.extend(starts.iter().copied().filter(|&key| conflicts(key)));

    while let Some(key) = queue.pop() {
        if !visited.insert(key) {
            continue;
        }
        region.push(key);
        let Some(triangle) = triangles.get(key) else {
            continue;
        };
        for (a, b) in triangle.directed_edges() {
            if let Some(&neighbor) = across.get(&(b, a)) {
                if !visited.contains(&neighbor) && conflicts(neighbor) {
                    queue.push(neighbor);
                }
            }
        }
    }
    region
}

/// How a hull edge relates to a point being inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeVisibility {
    /// The point is strictly outside the hull across this edge.
    Beyond,
    /// The point lies on the open edge.
    OnEdge,
    /// The point is on the inner side, or collinear but past an endpoint.
    Hidden,
}

/// Classifies `point` against the counter-clockwise hull edge `a -> b`.
fn edge_visibility(points: &[Point], (a, b): DirectedEdge, point: &Point) -> EdgeVisibility {
    let (pa, pb) = (&points[a], &points[b]);
    match orientation(pa, pb, point) {
        Orientation::NEGATIVE => EdgeVisibility::Beyond,
        Orientation::POSITIVE => EdgeVisibility::Hidden,
        Orientation::DEGENERATE => {
            let (dx, dy) = (pb.x() - pa.x(), pb.y() - pa.y());
            let from_a = (point.x() - pa.x()).mul_add(dx, (point.y() - pa.y()) * dy);
            let from_b = (point.x() - pb.x()).mul_add(-dx, (point.y() - pb.y()) * -dy);
            if from_a > 0.0 && from_b > 0.0 {
                EdgeVisibility::OnEdge
            } else {
                EdgeVisibility::Hidden
            }
        }
    }
}

/// Directed hull edges (interior on the left) with the triangle owning each.
fn hull_edges(triangles: &StorageMap<TriangleKey, Triangle>) -> Vec<(DirectedEdge, TriangleKey)> {
    let edges: FastHashSet<DirectedEdge> = triangles
        .values()
        .flat_map(Triangle::directed_edges)
        .collect();
    triangles
        .iter()
        .flat_map(|(key, triangle)| triangle.directed_edges().map(|edge| (edge, key)))
        .filter(|((a, b), _)| !edges.contains(&(*b, *a)))
        .collect()
}

/// Counter-clockwise indices of the first three points that span the plane.
fn seed_triangle(points: &[Point]) -> Option<[usize; 3]> {
    let first = points.first()?;
    let second = points.iter().position(|p| p != first)?;
    points.iter().enumerate().find_map(|(third, p)| {
        match orientation(first, &points[second], p) {
            Orientation::POSITIVE => Some([0, second, third]),
            Orientation::NEGATIVE => Some([0, third, second]),
            Orientation::DEGENERATE => None,
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================

//! Planar measures and point-set helpers shared by the hull algorithms.

use crate::geometry::point::Point;
use rustc_hash::FxHashSet;

/// Circumradius of the triangle `(a, b, c)`.
///
/// Uses `R = |ab| * |bc| * |ca| / (4 * area)`. Returns `None` for a triangle with
/// zero area, which has no finite circumcircle.
///
/// # Example
///
/// ```
/// use cellbound::geometry::point::Point;
/// use cellbound::geometry::util::circumradius;
///
/// // Right triangle: the hypotenuse is a diameter.
/// let r = circumradius(
///     &Point::new(0.0, 0.0),
///     &Point::new(4.0, 0.0),
///     &Point::new(0.0, 3.0),
/// )
/// .unwrap();
/// assert!((r - 2.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn circumradius(a: &Point, b: &Point, c: &Point) -> Option<f64> {
    let area = triangle_area(a, b, c).abs();
    if area <= 0.0 || !area.is_finite() {
        return None;
    }
    let product = a.distance(b) * b.distance(c) * c.distance(a);
    Some(product / (4.0 * area))
}

/// Signed area of the triangle `(a, b, c)`; positive when counter-clockwise.
#[must_use]
pub fn triangle_area(a: &Point, b: &Point, c: &Point) -> f64 {
    0.5 * (b.x() - a.x()).mul_add(c.y() - a.y(), -((b.y() - a.y()) * (c.x() - a.x())))
}

/// Signed shoelace area of a ring; positive when counter-clockwise.
///
/// The ring may be open or closed; a repeated closing point contributes nothing.
#[must_use]
pub fn signed_ring_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = ring
        .iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(p, q)| p.x().mul_add(q.y(), -(q.x() * p.y())))
        .sum();
    0.5 * twice_area
}

/// Removes exact coordinate duplicates, keeping the first occurrence.
///
/// `+0.0` and `-0.0` are treated as equal (see [`Point`]'s `Eq`).
#[must_use]
pub fn dedup_points_exact(points: &[Point]) -> Vec<Point> {
    let mut seen = FxHashSet::default();
    points.iter().copied().filter(|p| seen.insert(*p)).collect()
}

// =============================================================================
// TESTS
// =============================================================================

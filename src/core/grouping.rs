//! Partitioning of labeled transcripts into one point set per cell.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::table::{CellId, TranscriptRow};
use crate::geometry::point::Point;

/// Minimum number of points that can enclose an area.
pub const MIN_POLYGON_POINTS: usize = 3;

/// The points of one cell, in input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Wraps a list of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// The points, in input order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the set is too small to enclose an area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < MIN_POLYGON_POINTS
    }

    fn push(&mut self, point: Point) {
        self.points.push(point);
    }
}

impl From<Vec<Point>> for PointSet {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Point sets keyed by cell, iterated in ascending key order.
pub type CellGroups = BTreeMap<CellId, PointSet>;

/// Groups non-noise rows by cell.
///
/// Every row with a cell and without the noise flag lands in exactly one point
/// set; noise rows are skipped. No group is ever empty.
///
/// # Examples
///
/// ```
/// use cellbound::core::grouping::group_points;
/// use cellbound::core::table::{CellId, TranscriptTable};
/// use cellbound::geometry::point::Point;
///
/// let table = TranscriptTable::from_points([
///     (Point::new(0.0, 0.0), Some(CellId::from("b"))),
///     (Point::new(1.0, 0.0), None),
///     (Point::new(2.0, 0.0), Some(CellId::from("a"))),
///     (Point::new(3.0, 0.0), Some(CellId::from("b"))),
/// ]);
/// let groups = group_points(table.rows());
/// let keys: Vec<String> = groups.keys().map(ToString::to_string).collect();
/// assert_eq!(keys, ["a", "b"]);
/// assert_eq!(groups[&CellId::from("b")].len(), 2);
/// ```
pub fn group_points<'a, I>(rows: I) -> CellGroups
where
    I: IntoIterator<Item = &'a TranscriptRow>,
{
    let mut groups = CellGroups::new();
    for row in rows {
        if row.is_noise {
            continue;
        }
        if let Some(cell) = &row.cell {
            groups.entry(cell.clone()).or_default().push(row.point);
        }
    }
    groups
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::TranscriptTable;

    #[test]
    fn every_non_noise_point_is_grouped_once() {
        let table = TranscriptTable::from_points([
            (Point::new(0.0, 0.0), Some(CellId::from("a"))),
            (Point::new(1.0, 1.0), Some(CellId::from("a"))),
            (Point::new(2.0, 2.0), None),
            (Point::new(3.0, 3.0), Some(CellId::from("c"))),
        ]);
        let groups = group_points(table.rows());
        let total: usize = groups.values().map(PointSet::len).sum();
        assert_eq!(total, 3);
        assert!(groups.values().all(|set| !set.is_empty()));
    }

    #[test]
    fn points_keep_input_order_within_a_group() {
        let table = TranscriptTable::from_points([
            (Point::new(5.0, 0.0), Some(CellId::Code(1))),
            (Point::new(1.0, 0.0), Some(CellId::Code(1))),
            (Point::new(3.0, 0.0), Some(CellId::Code(1))),
        ]);
        let groups = group_points(table.rows());
        let xs: Vec<f64> = groups[&CellId::Code(1)].points().iter().map(Point::x).collect();
        assert_eq!(xs, vec![5.0, 1.0, 3.0]);
    }

    #[test]
    fn flagged_noise_rows_are_skipped_even_with_a_key() {
        let mut table = TranscriptTable::from_points([
            (Point::new(0.0, 0.0), Some(CellId::from("a"))),
            (Point::new(1.0, 0.0), Some(CellId::from("a"))),
        ]);
        let mut rows = table.rows().to_vec();
        rows[1].is_noise = true;
        table = TranscriptTable::new(table.columns().to_vec(), table.layout(), rows);
        assert_eq!(group_points(table.rows())[&CellId::from("a")].len(), 1);
    }

    #[test]
    fn degenerate_threshold() {
        assert!(PointSet::new(vec![Point::new(0.0, 0.0); 2]).is_degenerate());
        assert!(!PointSet::new(vec![Point::new(0.0, 0.0); 3]).is_degenerate());
    }
}

//! Rewriting of the transcript table against the cells that own a polygon.
//!
//! After reconciliation, a row carries a non-empty cell key exactly when its
//! original key owns a polygon in the [`GeometryCollection`]. The key is then
//! rewritten into the run's namespace (`<prefix><key>`). Every other row,
//! including rows that were already noise, gets an empty key and the noise flag.

use std::collections::BTreeSet;

use crate::core::geometry_collection::GeometryCollection;
use crate::core::table::{CellId, ColumnLayout, TranscriptTable};
use crate::geometry::point::Point;

/// Name of the noise flag column.
pub const NOISE_COLUMN: &str = "is_noise";

/// A transcript after reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledRow {
    /// Transcript position.
    pub point: Point,
    /// Namespaced cell key, empty for noise.
    pub cell: String,
    /// Whether the transcript has no polygon-backed cell.
    pub is_noise: bool,
    /// Raw source fields, in column order.
    pub fields: Vec<String>,
}

/// The transcript table with rewritten cell and noise columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledTable {
    columns: Vec<String>,
    layout: ColumnLayout,
    rows: Vec<ReconciledRow>,
}

impl ReconciledTable {
    /// All rows, in input order.
    #[must_use]
    pub fn rows(&self) -> &[ReconciledRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct non-empty cell keys.
    #[must_use]
    pub fn unique_cells(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .filter(|row| !row.cell.is_empty())
            .map(|row| row.cell.as_str())
            .collect()
    }

    /// Output header: the input columns, plus the noise column when the input
    /// had none.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        let mut header = self.columns.clone();
        if self.layout.is_noise.is_none() {
            header.push(NOISE_COLUMN.to_string());
        }
        header
    }

    /// Output fields of `row`, aligned with [`header`](Self::header).
    #[must_use]
    pub fn record(&self, row: &ReconciledRow) -> Vec<String> {
        let mut record = row.fields.clone();
        record.resize(self.columns.len(), String::new());
        let flag = if row.is_noise { "True" } else { "False" };
        if let Some(slot) = record.get_mut(self.layout.cell) {
            slot.clone_from(&row.cell);
        }
        match self.layout.is_noise.and_then(|index| record.get_mut(index)) {
            Some(slot) => *slot = flag.to_string(),
            None => record.push(flag.to_string()),
        }
        record
    }
}

/// Rewrites `table` so every non-empty key refers to a polygon in `collection`.
///
/// Pure: the same inputs always give the same table.
///
/// # Examples
///
/// ```
/// use cellbound::core::boundary::{BoundaryFailure, ResolvedPolygon};
/// use cellbound::core::geometry_collection::GeometryCollection;
/// use cellbound::core::reconcile::reconcile;
/// use cellbound::core::table::{CellId, TranscriptTable};
/// use cellbound::geometry::point::Point;
///
/// let table = TranscriptTable::from_points([
///     (Point::new(0.0, 0.0), Some(CellId::from("A"))),
///     (Point::new(9.0, 9.0), Some(CellId::from("B"))),
///     (Point::new(5.0, 5.0), None),
/// ]);
/// let ring = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
/// let collection = GeometryCollection::assemble(&[
///     (CellId::from("A"), Ok(ResolvedPolygon::new(CellId::from("A"), ring, 0))),
///     (CellId::from("B"), Err(BoundaryFailure::Degenerate { count: 1 })),
/// ]);
///
/// let reconciled = reconcile(&table, &collection, "run1-");
/// let cells: Vec<&str> = reconciled.rows().iter().map(|r| r.cell.as_str()).collect();
/// assert_eq!(cells, ["run1-A", "", ""]);
/// assert_eq!(reconciled.rows().iter().filter(|r| r.is_noise).count(), 2);
/// ```
#[must_use]
pub fn reconcile(
    table: &TranscriptTable,
    collection: &GeometryCollection,
    prefix: &str,
) -> ReconciledTable {
    let valid: BTreeSet<CellId> = collection.valid_cells();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let cell = row
                .cell
                .as_ref()
                .filter(|cell| !row.is_noise && valid.contains(cell))
                .map(|cell| cell.prefixed(prefix));
            ReconciledRow {
                point: row.point,
                is_noise: cell.is_none(),
                cell: cell.unwrap_or_default(),
                fields: row.fields.clone(),
            }
        })
        .collect();
    ReconciledTable {
        columns: table.columns().to_vec(),
        layout: table.layout(),
        rows,
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Transcript table: labeled points plus the passthrough columns of each row.
//!
//! The table is the unit handed between the I/O layer and the pipeline. Rows
//! keep every source field verbatim so the reconciled table can be written back
//! with the same columns it was read with.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::point::Point;

// =============================================================================
// CELL IDENTIFIERS
// =============================================================================

/// Group key of a transcript: the cell it is assigned to.
///
/// Keys are either the verbatim text of the input column or, after
/// [`TranscriptTable::encode_category_codes`], a dense integer code. Codes
/// serialize as JSON numbers and names as JSON strings.
///
/// # Examples
///
/// ```
/// use cellbound::core::table::CellId;
///
/// assert_eq!(CellId::from("cell_7").to_string(), "cell_7");
/// assert_eq!(CellId::Code(3).to_string(), "3");
/// assert_eq!(CellId::Code(3).prefixed("prefix-"), "prefix-3");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellId {
    /// Dense integer code.
    Code(u32),
    /// Verbatim key text.
    Name(String),
}

impl CellId {
    /// The key rewritten into the namespace given by `prefix`.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> String {
        format!("{prefix}{self}")
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for CellId {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for CellId {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<u32> for CellId {
    fn from(code: u32) -> Self {
        Self::Code(code)
    }
}

// =============================================================================
// ROWS AND LAYOUT
// =============================================================================

/// One transcript: a labeled point and the raw fields of its source row.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptRow {
    /// Transcript position.
    pub point: Point,
    /// Assigned cell, `None` for noise.
    pub cell: Option<CellId>,
    /// Whether the transcript carries no cell assignment.
    pub is_noise: bool,
    /// Raw source fields, in column order.
    pub fields: Vec<String>,
}

impl TranscriptRow {
    /// Creates a row; the noise flag follows from whether a cell is present.
    #[must_use]
    pub fn new(point: Point, cell: Option<CellId>, fields: Vec<String>) -> Self {
        let is_noise = cell.is_none();
        Self {
            point,
            cell,
            is_noise,
            fields,
        }
    }
}

/// Positions of the columns the pipeline reads and rewrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    /// x-coordinate column.
    pub x: usize,
    /// y-coordinate column.
    pub y: usize,
    /// Group key column.
    pub cell: usize,
    /// Pre-existing noise flag column, overwritten on output.
    pub is_noise: Option<usize>,
}

/// A table of transcripts.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptTable {
    columns: Vec<String>,
    layout: ColumnLayout,
    rows: Vec<TranscriptRow>,
}

impl TranscriptTable {
    /// Creates a table from its header, column layout and rows.
    #[must_use]
    pub const fn new(columns: Vec<String>, layout: ColumnLayout, rows: Vec<TranscriptRow>) -> Self {
        Self {
            columns,
            layout,
            rows,
        }
    }

    /// Builds a table holding only the x, y and cell columns, with fields
    /// rendered from the points and keys. Convenient for callers that do not
    /// come from a file.
    #[must_use]
    pub fn from_points<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Point, Option<CellId>)>,
    {
        let rows = rows
            .into_iter()
            .map(|(point, cell)| {
                let fields = vec![
                    point.x().to_string(),
                    point.y().to_string(),
                    cell.as_ref().map(ToString::to_string).unwrap_or_default(),
                ];
                TranscriptRow::new(point, cell, fields)
            })
            .collect();
        Self {
            columns: vec!["x".to_string(), "y".to_string(), "cell".to_string()],
            layout: ColumnLayout {
                x: 0,
                y: 1,
                cell: 2,
                is_noise: None,
            },
            rows,
        }
    }

    /// Header names, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column positions.
    #[must_use]
    pub const fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// All rows, noise included.
    #[must_use]
    pub fn rows(&self) -> &[TranscriptRow] {
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

    /// Number of rows flagged as noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_noise).count()
    }

    /// Renumbers cell keys to dense integer codes in ascending key order.
    ///
    /// Keys that all parse as numbers are ordered numerically, otherwise
    /// lexically. Noise rows are untouched. Returns the code assigned to each
    /// original key.
    pub fn encode_category_codes(&mut self) -> BTreeMap<CellId, CellId> {
        let mut categories: Vec<CellId> = self
            .rows
            .iter()
            .filter_map(|row| row.cell.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        let numeric: Option<Vec<f64>> = categories
            .iter()
            .map(|cell| cell.to_string().trim().parse::<f64>().ok())
            .collect();
        if let Some(values) = numeric {
            let mut keyed: Vec<(f64, CellId)> = values.into_iter().zip(categories).collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            categories = keyed.into_iter().map(|(_, cell)| cell).collect();
        }

        let codes: BTreeMap<CellId, CellId> = categories
            .into_iter()
            .zip(0_u32..)
            .map(|(cell, code)| (cell, CellId::Code(code)))
            .collect();

        for row in &mut self.rows {
            if let Some(code) = row.cell.as_ref().and_then(|cell| codes.get(cell)) {
                row.cell = Some(code.clone());
            }
        }
        codes
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! CSV reading of transcript tables and writing of reconciled tables.
//!
//! The header is required. The x, y and cell columns are located by name; every
//! other column is carried through untouched. A cell field that is empty or one
//! of the usual missing-value markers (`NA`, `nan`, `None`, ...) marks the row
//! as noise.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::config::ColumnNames;
use crate::core::reconcile::{NOISE_COLUMN, ReconciledTable};
use crate::core::table::{CellId, ColumnLayout, TranscriptRow, TranscriptTable};
use crate::geometry::point::Point;
use crate::io::error::{InputError, OutputError};

/// Cell field values read as "no cell".
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a cell field denotes a missing assignment.
#[must_use]
pub fn is_missing_marker(field: &str) -> bool {
    MISSING_MARKERS.contains(&field.trim())
}

/// Reads a transcript table from CSV text.
///
/// # Errors
///
/// Returns an [`InputError`] if the CSV is malformed, a configured column is
/// missing, or a coordinate is not a finite number.
///
/// # Examples
///
/// ```
/// use cellbound::config::ColumnNames;
/// use cellbound::io::csv_table::read_transcripts;
///
/// let text = "gene,x,y,cell\nACTB,1.0,2.0,c1\nGAPDH,3.5,0.5,\n";
/// let table = read_transcripts(text.as_bytes(), &ColumnNames::default()).unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.noise_count(), 1);
/// ```
pub fn read_transcripts<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<TranscriptTable, InputError> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let header: Vec<String> = reader.headers()?.iter().map(ToString::to_string).collect();

    let find = |name: &str| {
        header
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| InputError::MissingColumn {
                name: name.to_string(),
                found: header.join(","),
            })
    };
    let layout = ColumnLayout {
        x: find(&columns.x)?,
        y: find(&columns.y)?,
        cell: find(&columns.cell)?,
        is_noise: header.iter().position(|column| column == NOISE_COLUMN),
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let coordinate = |index: usize, name: &str| -> Result<f64, InputError> {
            let raw = record.get(index).unwrap_or_default();
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| InputError::InvalidCoordinate {
                    line,
                    column: name.to_string(),
                    value: raw.to_string(),
                })
        };
        let point = Point::new(
            coordinate(layout.x, &columns.x)?,
            coordinate(layout.y, &columns.y)?,
        );
        let cell = record
            .get(layout.cell)
            .filter(|field| !is_missing_marker(field))
            .map(CellId::from);
        let fields = record.iter().map(ToString::to_string).collect();
        rows.push(TranscriptRow::new(point, cell, fields));
    }

    tracing::debug!(rows = rows.len(), columns = header.len(), "read transcript table");
    Ok(TranscriptTable::new(header, layout, rows))
}

/// Reads a transcript table from a CSV file.
///
/// # Errors
///
/// Returns [`InputError::Open`] if the file cannot be opened, otherwise as
/// [`read_transcripts`].
pub fn read_transcripts_path(
    path: &Path,
    columns: &ColumnNames,
) -> Result<TranscriptTable, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_transcripts(BufReader::new(file), columns)
}

/// Writes a reconciled table as CSV.
///
/// # Errors
///
/// Returns an [`OutputError`] if serialization or the underlying write fails.
pub fn write_reconciled<W: Write>(writer: W, table: &ReconciledTable) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(table.header())?;
    for row in table.rows() {
        writer.write_record(table.record(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a reconciled table to a CSV file, replacing any existing file.
///
/// # Errors
///
/// Returns [`OutputError::Create`] if the file cannot be created, otherwise as
/// [`write_reconciled`].
pub fn write_reconciled_path(path: &Path, table: &ReconciledTable) -> Result<(), OutputError> {
    let file = File::create(path).map_err(|source| OutputError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_reconciled(BufWriter::new(file), table)
}

// =============================================================================
// TESTS
// =============================================================================

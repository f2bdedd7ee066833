//! Errors of the file layer. All of them are fatal for a run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the transcript table.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input file could not be opened.
    #[error("Cannot open input {path}: {source}")]
    Open {
        /// Input path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The CSV layer rejected the input (bad encoding, ragged rows, ...).
    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),
    /// A required column is absent from the header.
    #[error("Missing required column '{name}' (found: {found})")]
    MissingColumn {
        /// Configured column name.
        name: String,
        /// Comma-separated header as read.
        found: String,
    },
    /// A coordinate field is not a finite number.
    #[error("Invalid {column} coordinate '{value}' on line {line}")]
    InvalidCoordinate {
        /// 1-based line number in the input file.
        line: u64,
        /// Column name.
        column: String,
        /// Raw field text.
        value: String,
    },
}

/// Errors raised while writing an output artifact.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output file could not be created.
    #[error("Cannot create output {path}: {source}")]
    Create {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Writing or flushing failed.
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
    /// CSV serialization failed.
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    /// JSON serialization failed.
    #[error("GeoJSON write failed: {0}")]
    Json(#[from] serde_json::Error),
}

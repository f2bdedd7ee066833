//! Run configuration.
//!
//! A [`PipelineConfig`] holds every pipeline-wide constant: the shape parameter,
//! the output key namespace, the worker count and the input column names.
//! Configurations are usually built with [`PipelineConfigBuilder`]:
//!
//! ```
//! use cellbound::config::{KeyEncoding, PipelineConfigBuilder};
//!
//! let config = PipelineConfigBuilder::default()
//!     .alpha(0.05)
//!     .prefix("run7-")
//!     .workers(4_usize)
//!     .key_encoding(KeyEncoding::CategoryCodes)
//!     .build()
//!     .unwrap();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.columns.cell, "cell");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dispatch::default_worker_count;

/// Default namespace prepended to output cell keys.
pub const DEFAULT_PREFIX: &str = "prefix-";

/// Configuration errors. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The shape parameter is negative, NaN or infinite.
    #[error("Invalid alpha {alpha}: must be finite and non-negative")]
    InvalidAlpha {
        /// The rejected value.
        alpha: f64,
    },
    /// The worker count is zero.
    #[error("Worker count must be at least 1")]
    NoWorkers,
    /// Two of the x, y and cell columns share a name.
    #[error("Column '{name}' is mapped to more than one role")]
    DuplicateColumn {
        /// The repeated column name.
        name: String,
    },
    /// The builder could not produce a configuration.
    #[error("Invalid configuration: {0}")]
    Builder(#[from] PipelineConfigBuilderError),
}

/// How cell keys are read from the input column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEncoding {
    /// Keys are the column text, unchanged.
    #[default]
    Verbatim,
    /// Keys are renumbered to dense integer codes in ascending key order.
    CategoryCodes,
}

/// Names of the input columns the pipeline reads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    /// x-coordinate column.
    pub x: String,
    /// y-coordinate column.
    pub y: String,
    /// Cell key column; rewritten on output.
    pub cell: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            x: "x".to_string(),
            y: "y".to_string(),
            cell: "cell".to_string(),
        }
    }
}

/// Pipeline-wide settings.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(default)]
pub struct PipelineConfig {
    /// Alpha-shape parameter; `0.0` gives the convex hull.
    pub alpha: f64,
    /// Namespace prepended to every output cell key.
    #[builder(setter(into))]
    pub prefix: String,
    /// Worker threads for boundary fitting.
    pub workers: usize,
    /// Input column names.
    pub columns: ColumnNames,
    /// Cell key encoding.
    pub key_encoding: KeyEncoding,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            prefix: DEFAULT_PREFIX.to_string(),
            workers: default_worker_count(),
            columns: ColumnNames::default(),
            key_encoding: KeyEncoding::default(),
        }
    }
}

impl PipelineConfig {
    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a negative or non-finite alpha, a zero
    /// worker count, or column names that collide.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ConfigError::InvalidAlpha { alpha: self.alpha });
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let ColumnNames { x, y, cell } = &self.columns;
        for (a, b) in [(x, y), (x, cell), (y, cell)] {
            if a == b {
                return Err(ConfigError::DuplicateColumn { name: a.clone() });
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

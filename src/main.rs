//! `cellbound` command-line interface.
//!
//! Reads a transcript CSV, writes the cell boundary GeoJSON and the reconciled
//! transcript CSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cellbound::config::{ColumnNames, DEFAULT_PREFIX, KeyEncoding, PipelineConfig};
use cellbound::core::dispatch::default_worker_count;
use cellbound::io::csv_table::{read_transcripts_path, write_reconciled_path};
use cellbound::io::geojson::write_geometry_collection_path;
use cellbound::pipeline::run;

/// Cellbound - per-cell boundary polygons from transcript assignments
#[derive(Parser, Debug)]
#[command(name = "cellbound", version, about)]
struct Cli {
    /// Transcript table (CSV with header)
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Where to write the cell boundary GeometryCollection
    #[arg(long, value_name = "FILE")]
    output_geojson: PathBuf,

    /// Where to write the reconciled transcript table
    #[arg(long, value_name = "FILE")]
    output_csv: PathBuf,

    /// Alpha-shape parameter (0 gives the convex hull)
    #[arg(long, default_value_t = 0.0)]
    alpha: f64,

    /// Namespace prepended to output cell keys
    #[arg(long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Worker threads (default: available cores minus one)
    #[arg(long)]
    workers: Option<usize>,

    /// x-coordinate column
    #[arg(long, default_value = "x")]
    x_column: String,

    /// y-coordinate column
    #[arg(long, default_value = "y")]
    y_column: String,

    /// Cell key column
    #[arg(long, default_value = "cell")]
    cell_column: String,

    /// Renumber cell keys to integer codes in sorted key order
    #[arg(long)]
    category_codes: bool,
}

impl Cli {
    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            alpha: self.alpha,
            prefix: self.prefix.clone(),
            workers: self.workers.unwrap_or_else(default_worker_count),
            columns: ColumnNames {
                x: self.x_column.clone(),
                y: self.y_column.clone(),
                cell: self.cell_column.clone(),
            },
            key_encoding: if self.category_codes {
                KeyEncoding::CategoryCodes
            } else {
                KeyEncoding::Verbatim
            },
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate().context("invalid configuration")?;

    let table = read_transcripts_path(&cli.input, &config.columns)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let output = run(&table, &config).context("pipeline failed")?;

    write_geometry_collection_path(&cli.output_geojson, &output.collection)
        .with_context(|| format!("failed to write {}", cli.output_geojson.display()))?;
    write_reconciled_path(&cli.output_csv, &output.table)
        .with_context(|| format!("failed to write {}", cli.output_csv.display()))?;

    println!("Processed {} cells successfully", output.summary.valid);
    println!("Total unique cells: {}", output.summary.unique_output_keys);
    if output.summary.dropped > 0 {
        println!(
            "Dropped {} cells ({} degenerate, {} fitting failures, {} worker faults)",
            output.summary.dropped,
            output.summary.degenerate,
            output.summary.fitting_failures,
            output.summary.worker_faults
        );
    }
    Ok(())
}

//! Batch driver: read a Reef Check survey export, run the pipeline, write
//! the tidy site-level table.
//!
//! Nothing is written unless every stage succeeds.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use reefcheck_pipeline::ingest::survey_csv;
use reefcheck_pipeline::logging::{self, LogLevel};
use reefcheck_pipeline::{PipelineConfig, Stage, load_config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "reefcheck_pipeline",
    about = "Aggregate Reef Check segment surveys into a tidy site-level table"
)]
struct Cli {
    /// Raw survey export (delimited, one row per segment and substrate code)
    #[arg(long)]
    input: PathBuf,

    /// Destination for the tidy table
    #[arg(long)]
    output: PathBuf,

    /// TOML configuration; falls back to $REEFCHECK_CONFIG, then defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// debug, info, warn or error
    #[arg(long, default_value = "info")]
    log_level: LogLevel,

    /// Also append log lines to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Prefix console log lines with timestamps
    #[arg(long)]
    timestamps: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init_logger(cli.log_level, cli.log_file.as_deref(), cli.timestamps);
    logging::debug(
        Stage::Normalize,
        None,
        &format!("logging at {} and above", cli.log_level),
    );

    let config_path = cli
        .config
        .or_else(|| std::env::var_os("REEFCHECK_CONFIG").map(PathBuf::from));
    let config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    let table = survey_csv::read_raw_table_from_path(&cli.input)
        .with_context(|| format!("failed to read survey export {}", cli.input.display()))?;
    logging::info(
        Stage::Normalize,
        None,
        &format!("read {} rows from {}", table.rows.len(), cli.input.display()),
    );

    let output = pipeline::run(table, &config)?;

    survey_csv::write_tidy_table_to_path(&cli.output, &output.records)
        .with_context(|| format!("failed to write tidy table {}", cli.output.display()))?;
    logging::info(
        Stage::Convert,
        None,
        &format!(
            "wrote {} site records to {}",
            output.summary.tidy_records,
            cli.output.display()
        ),
    );

    Ok(())
}

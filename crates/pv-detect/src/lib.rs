//! PV Household Detection Pipeline
//!
//! Wires the reshaping, feature extraction, ranking and benchmark crates
//! into one run driven by a layered configuration.

mod config;
mod ingest;
mod pipeline;

pub use config::{InputConfig, LoggingConfig, OutputConfig, OutputFormat, PipelineConfig};
pub use ingest::{read_labels, read_readings};
pub use pipeline::{
    build_table, render_text, run_pipeline, select_features, PipelineReport, Skipped,
};

use anyhow::{Context, Result};
use std::fs::File;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level: Level = config
        .level
        .parse()
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    installed.context("failed to set tracing subscriber")
}

/// Read the configured input files and run the pipeline
pub fn run(config: &PipelineConfig) -> Result<PipelineReport> {
    let readings = File::open(&config.input.readings)
        .with_context(|| format!("failed to open {}", config.input.readings.display()))?;
    let labels = File::open(&config.input.labels)
        .with_context(|| format!("failed to open {}", config.input.labels.display()))?;

    let series = read_readings(readings)?;
    let labels = read_labels(labels)?;
    run_pipeline(config, &series, &labels)
}

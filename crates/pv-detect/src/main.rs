//! PV Detection - Main Entry Point
//!
//! Usage: `pv-detect [config.toml]`

use anyhow::Result;
use pv_detect::{init_logging, render_text, run, OutputFormat, PipelineConfig};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(path.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== PV Detection v{} ===", env!("CARGO_PKG_VERSION"));

    let report = run(&config)?;
    match config.output.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(())
}

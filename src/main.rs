//! SplitX batch video splitter
//!
//! Splits, trims, merges and extracts audio from video files by driving an
//! external FFmpeg binary, one input at a time.
//!
//! # Usage
//!
//! ```bash
//! splitter split talk.mp4 lecture.mov --parts 4
//! splitter split ./recordings --duration 10:00 --archive per-file --cleanup
//! splitter trim talk.mp4 --start 00:01:00 --end 00:02:30 --precise
//! splitter merge intro.mp4 body.mp4 --output full.mp4
//! splitter extract-audio talk.mp4 --format wav
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use splitx_cli::cli::{commands, Cli};
use splitx_cli::config_initialization::initialize_configuration;
use splitx_cli::utils::logging::{init_logging, LogFormat};

/// Main entry point for the SplitX CLI application
#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = initialize_configuration(&cli)?;

    // Initialize logging
    let format: LogFormat = cli.log_format.parse().unwrap_or_default();
    init_logging(&config.log_level, format);

    info!("Starting SplitX ({})", env!("CARGO_PKG_VERSION"));

    let code = commands::execute(cli, config).await?;

    info!("SplitX finished");
    Ok(code)
}

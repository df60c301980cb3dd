//! Command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::adapters::toml_config::AppConfig;
use crate::app::{AppContainer, BatchInteractor, BatchRequest, DefaultAppContainer};
use crate::cli::args::ProbeArgs;
use crate::cli::{Cli, Commands};
use crate::domain::model::{BatchReport, Operation, SizingStrategy};
use crate::domain::rules::SizingRules;
use crate::engine::progress::{BatchEvent, ChannelSink, Reporter};
use crate::utils::time::TimeParser;
use crate::utils::Utils;

/// Extensions picked up when a directory is given as input
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v", "ts", "flv", "wmv"];

/// Execute the parsed command line against a resolved configuration
pub async fn execute(cli: Cli, config: AppConfig) -> Result<ExitCode> {
    let container = DefaultAppContainer::new(&config);
    let json = cli.command.json();

    match cli.command {
        Commands::Probe(args) => probe(&container, &args).await,
        command => {
            let request = build_request(command, &config)?;
            let report = run_batch(container.batch_interactor(), request, json).await?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialize report")?
                );
            }
            Ok(if report.all_succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}

/// Turn a batch command and the configuration into a `BatchRequest`
pub fn build_request(command: Commands, config: &AppConfig) -> Result<BatchRequest> {
    let request = match command {
        Commands::Split(args) => {
            let strategy = if args.parts.is_some() || args.duration.is_some() || args.size_mb.is_some() {
                SizingStrategy::from_options(args.parts, args.duration, args.size_mb)?
            } else {
                config.default_strategy()?
            };
            SizingRules::validate(&strategy)?;
            info!("Split strategy: {}", strategy);

            BatchRequest::new(
                expand_inputs(&args.inputs),
                Operation::Split {
                    strategy,
                    archive: config.archive_mode,
                    cleanup: config.cleanup,
                    precise: config.precise,
                    naming_pattern: config.naming_pattern.clone(),
                },
            )
            .with_output_dir(config.output_dir.clone())
        }
        Commands::Trim(args) => BatchRequest::new(
            expand_inputs(&args.inputs),
            Operation::Trim {
                start: args.start,
                end: args.end,
                precise: config.precise,
            },
        )
        .with_output_dir(config.output_dir.clone()),
        Commands::Merge(args) => BatchRequest::new(
            expand_inputs(&args.inputs),
            Operation::Merge {
                output: args.output,
            },
        ),
        Commands::ExtractAudio(args) => BatchRequest::new(
            expand_inputs(&args.inputs),
            Operation::ExtractAudio {
                format: config.audio_format,
            },
        )
        .with_output_dir(config.output_dir.clone()),
        Commands::Probe(_) => anyhow::bail!("probe does not run as a batch"),
    };
    Ok(request)
}

/// Expand directories into the video files directly inside them, sorted by
/// name. Other paths pass through untouched so missing files fail per input.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut expanded = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !input.is_dir() {
            expanded.push(input.clone());
            continue;
        }

        let before = expanded.len();
        for entry in WalkDir::new(input)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_video(entry.path()) {
                expanded.push(entry.into_path());
            }
        }
        if expanded.len() == before {
            warn!("No video files found in {}", input.display());
        }
    }
    expanded
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// One event as printed in JSON mode
#[derive(Serialize)]
struct EventLine<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a BatchEvent,
}

/// Run the batch on a worker task and render its events as they arrive
async fn run_batch(
    interactor: Arc<BatchInteractor>,
    request: BatchRequest,
    json: bool,
) -> Result<BatchReport> {
    let (sink, mut events) = ChannelSink::new();
    let reporter = Reporter::from_sink(Arc::new(sink));

    let worker = tokio::spawn(async move { interactor.run(request, &reporter).await });

    while let Some(event) = events.recv().await {
        render(&event, json);
    }

    worker.await.context("Batch worker stopped unexpectedly")
}

/// Lifecycle lines go to stdout; in JSON mode every event goes to stderr as
/// a timestamped JSON line so stdout carries only the report
fn render(event: &BatchEvent, json: bool) {
    if json {
        let line = EventLine {
            timestamp: Utc::now(),
            event,
        };
        if let Ok(text) = serde_json::to_string(&line) {
            eprintln!("{}", text);
        }
        return;
    }

    match event {
        BatchEvent::Log { message } => println!("{}", message),
        BatchEvent::Progress { fraction } => debug!("Progress: {:.0}%", fraction * 100.0),
    }
}

/// Execute the probe command
async fn probe(container: &DefaultAppContainer, args: &ProbeArgs) -> Result<ExitCode> {
    let asset = container
        .probe()
        .probe_asset(&args.input)
        .await
        .with_context(|| format!("Failed to probe {}", args.input.display()))?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&asset).context("Failed to serialize probe result")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!("File: {}", asset.path.display());
    println!("Size: {}", Utils::format_file_size(asset.size_bytes));
    if let Some(duration) = asset.duration {
        println!(
            "Duration: {} ({:.2}s)",
            TimeParser::new().format_time(duration),
            duration
        );
    }
    Ok(ExitCode::SUCCESS)
}

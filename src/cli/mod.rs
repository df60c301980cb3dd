//! CLI module for SplitX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// SplitX batch video splitter
///
/// Splits, trims, merges and extracts audio from video files by driving an
/// external FFmpeg binary.
#[derive(Parser, Debug)]
#[command(name = "splitter")]
#[command(about = "SplitX - batch video splitting, trimming, merging and audio extraction")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, or legacy JSON settings)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Diagnostic log format
    #[arg(long, global = true, default_value = "pretty", value_parser = ["pretty", "json"])]
    pub log_format: String,

    /// Path to the ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split videos into parts by count, duration or size
    Split(args::SplitArgs),
    /// Keep one time range of each video
    Trim(args::TrimArgs),
    /// Join videos end to end
    Merge(args::MergeArgs),
    /// Extract the audio track of each video
    ExtractAudio(args::ExtractAudioArgs),
    /// Show size and duration of a video
    Probe(args::ProbeArgs),
}

impl Commands {
    /// Whether the command prints a JSON report
    pub fn json(&self) -> bool {
        match self {
            Self::Split(a) => a.json,
            Self::Trim(a) => a.json,
            Self::Merge(a) => a.json,
            Self::ExtractAudio(a) => a.json,
            Self::Probe(a) => a.json,
        }
    }
}

//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::rules::MAX_PARTS;
use crate::utils::time::parse_time;

/// Parse a part count within the supported range
fn parse_parts(s: &str) -> Result<u32, String> {
    clap_num::number_range(s, 2, MAX_PARTS as u32)
}

/// Parse a positive, finite number
fn parse_positive(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err("must be greater than zero".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse seconds, `MM:SS` or `HH:MM:SS`
fn parse_clock(s: &str) -> Result<f64, String> {
    parse_time(s).map_err(|e| e.to_string())
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input video files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Split into N equal parts (2-10000)
    #[arg(long, value_parser = parse_parts, conflicts_with_all = ["duration", "size_mb"])]
    pub parts: Option<u32>,

    /// Seconds per part (seconds, MM:SS or HH:MM:SS)
    #[arg(long, value_parser = parse_clock, conflicts_with = "size_mb")]
    pub duration: Option<f64>,

    /// Target megabytes per part
    #[arg(long, value_parser = parse_positive)]
    pub size_mb: Option<f64>,

    /// Archive policy
    #[arg(long, value_parser = ["none", "bundle", "per-file", "individual"])]
    pub archive: Option<String>,

    /// Remove raw parts once archived
    #[arg(long)]
    pub cleanup: bool,

    /// Re-encode for frame-accurate cuts
    #[arg(long)]
    pub precise: bool,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Naming pattern, e.g. "{name}_part{num}.mp4"
    #[arg(long)]
    pub naming: Option<String>,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Input video files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Start time (seconds, MM:SS or HH:MM:SS)
    #[arg(short, long, value_parser = parse_clock)]
    pub start: f64,

    /// End time (seconds, MM:SS or HH:MM:SS)
    #[arg(short, long, value_parser = parse_clock)]
    pub end: f64,

    /// Re-encode for frame-accurate cuts
    #[arg(long)]
    pub precise: bool,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Videos to join, in order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (default: merged.mp4 next to the first input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the extract-audio command
#[derive(Args, Debug)]
pub struct ExtractAudioArgs {
    /// Input video files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Audio format
    #[arg(short, long, value_parser = ["mp3", "wav"])]
    pub format: Option<String>,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Print the batch report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_range() {
        assert_eq!(parse_parts("2"), Ok(2));
        assert_eq!(parse_parts("10000"), Ok(10_000));
        assert!(parse_parts("1").is_err());
        assert!(parse_parts("10001").is_err());
        assert!(parse_parts("many").is_err());
    }

    #[test]
    fn positive_numbers() {
        assert_eq!(parse_positive("2.5"), Ok(2.5));
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("-1").is_err());
        assert!(parse_positive("NaN").is_err());
    }

    #[test]
    fn clock_values() {
        assert_eq!(parse_clock("1:00"), Ok(60.0));
        assert!(parse_clock("soon").is_err());
    }
}

// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SplitXError, SplitXResult};

/// Bytes in one megabyte as the sizing strategy understands it (MiB)
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A source media file identified by its absolute path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAsset {
    /// Absolute file path
    pub path: PathBuf,
    /// File name without extension
    pub stem: String,
    /// Extension without the leading dot (may be empty)
    pub extension: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Probed duration in seconds, filled in by the probe stage
    pub duration: Option<f64>,
}

impl MediaAsset {
    /// Resolve an input path into an asset, failing if it does not exist
    pub fn open(path: impl AsRef<Path>) -> SplitXResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SplitXError::not_found(path));
        }

        let path = std::path::absolute(path)?;
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_file() {
            return Err(SplitXError::validation(format!(
                "Not a regular file: {}",
                path.display()
            )));
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path,
            stem,
            extension,
            size_bytes: metadata.len(),
            duration: None,
        })
    }

    /// Attach a probed duration
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// File name including extension, for log lines
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// One contiguous time range of the source assigned to one output file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// 1-based position in the plan
    pub index: usize,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, contiguous, non-overlapping segments covering a whole source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitPlan {
    /// Source duration the plan covers
    pub duration: f64,
    /// Nominal length of every segment but the last
    pub part_length: f64,
    /// Strategy that produced the plan
    pub strategy: SizingStrategy,
    /// Source size used by size-based planning
    pub file_size_bytes: u64,
    pub segments: Vec<Segment>,
}

impl SplitPlan {
    pub fn total_parts(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Human-readable summary lines logged before splitting starts
    pub fn describe(&self) -> Vec<String> {
        match self.strategy {
            SizingStrategy::ByCount(parts) => vec![format!(
                "Duration: {:.2}s | Split into {} parts",
                self.duration, parts
            )],
            SizingStrategy::ByDuration(seconds) => vec![format!(
                "Duration: {:.2}s | {}s per part = {} parts",
                self.duration,
                seconds,
                self.total_parts()
            )],
            SizingStrategy::BySize(target_mb) => {
                let size_mb = self.file_size_bytes as f64 / BYTES_PER_MB;
                let bitrate_bps = if self.duration > 0.0 {
                    (self.file_size_bytes as f64 * 8.0) / self.duration
                } else {
                    0.0
                };
                vec![
                    format!("File Size: {:.2}MB | Target: {:.2}MB", size_mb, target_mb),
                    format!(
                        "Bitrate: {:.2} kbps | {} parts @ {:.2}s each",
                        bitrate_bps / 1024.0,
                        self.total_parts(),
                        self.part_length
                    ),
                ]
            }
        }
    }
}

/// How a split decides where to cut. Exactly one applies per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingStrategy {
    /// Fixed number of equal parts
    ByCount(u32),
    /// Fixed part length in seconds
    ByDuration(f64),
    /// Target part size in megabytes
    BySize(f64),
}

impl SizingStrategy {
    /// Build a strategy from a flat set of optional front-end fields.
    ///
    /// Zero or several populated fields is a configuration error.
    pub fn from_options(
        parts: Option<u32>,
        duration_per_part: Option<f64>,
        target_size_mb: Option<f64>,
    ) -> SplitXResult<Self> {
        match (parts, duration_per_part, target_size_mb) {
            (Some(n), None, None) => Ok(Self::ByCount(n)),
            (None, Some(d), None) => Ok(Self::ByDuration(d)),
            (None, None, Some(mb)) => Ok(Self::BySize(mb)),
            (None, None, None) => Err(SplitXError::config(
                "Either 'parts', 'duration_per_part', or 'target_size_mb' must be specified",
            )),
            _ => Err(SplitXError::config(
                "Specify only one of: 'parts', 'duration_per_part', or 'target_size_mb'",
            )),
        }
    }
}

impl fmt::Display for SizingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByCount(n) => write!(f, "{} parts", n),
            Self::ByDuration(d) => write!(f, "{}s per part", d),
            Self::BySize(mb) => write!(f, "{}MB per part", mb),
        }
    }
}

/// Which setting decides the default sizing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    #[default]
    Count,
    Duration,
    Size,
}

impl FromStr for SplitMode {
    type Err = SplitXError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" | "parts" => Ok(Self::Count),
            "duration" | "time" => Ok(Self::Duration),
            "size" => Ok(Self::Size),
            other => Err(SplitXError::config(format!(
                "Unknown split mode '{}' (expected count, duration or size)",
                other
            ))),
        }
    }
}

/// Archive policy applied to generated files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveMode {
    /// Leave raw files
    None,
    /// One archive with every generated file for an input
    #[default]
    Bundle,
    /// One archive per generated file
    #[serde(alias = "individual")]
    PerFile,
}

impl ArchiveMode {
    /// Raw files may only be removed once an archive holds them
    pub fn permits_cleanup(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl FromStr for ArchiveMode {
    type Err = SplitXError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "no" => Ok(Self::None),
            "bundle" | "one" => Ok(Self::Bundle),
            "per-file" | "per_file" | "perfile" | "individual" => Ok(Self::PerFile),
            other => Err(SplitXError::config(format!(
                "Unknown archive mode '{}' (expected none, bundle or per-file)",
                other
            ))),
        }
    }
}

impl fmt::Display for ArchiveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::Bundle => "bundle",
            Self::PerFile => "per-file",
        };
        f.write_str(label)
    }
}

/// Container requested for audio extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Lossy compressed
    #[default]
    Mp3,
    /// Uncompressed PCM
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    pub fn codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Wav => "pcm_s16le",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = SplitXError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            other => Err(SplitXError::config(format!(
                "Unsupported audio format '{}' (expected mp3 or wav)",
                other
            ))),
        }
    }
}

/// Operation selected for a batch run, with its parameters
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Split {
        strategy: SizingStrategy,
        archive: ArchiveMode,
        cleanup: bool,
        precise: bool,
        naming_pattern: Option<String>,
    },
    Trim {
        start: f64,
        end: f64,
        precise: bool,
    },
    Merge {
        output: Option<PathBuf>,
    },
    ExtractAudio {
        format: AudioFormat,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Split { .. } => "split",
            Self::Trim { .. } => "trim",
            Self::Merge { .. } => "merge",
            Self::ExtractAudio { .. } => "extract-audio",
        }
    }
}

/// Outcome of running one input through its pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub input: PathBuf,
    pub success: bool,
    /// Files left on disk by the pipeline (partial on failure)
    pub outputs: Vec<PathBuf>,
    pub error: Option<String>,
    /// Error category tag (`probe`, `transcode`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl OperationResult {
    pub fn succeeded(input: impl Into<PathBuf>, outputs: Vec<PathBuf>) -> Self {
        Self {
            input: input.into(),
            success: true,
            outputs,
            error: None,
            error_kind: None,
        }
    }

    pub fn failed(input: impl Into<PathBuf>, outputs: Vec<PathBuf>, error: &SplitXError) -> Self {
        Self {
            input: input.into(),
            success: false,
            outputs,
            error: Some(error.detail()),
            error_kind: Some(error.kind()),
        }
    }
}

/// Batch-level state. Individual failures never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchState {
    #[default]
    Idle,
    Running,
}

/// Stages of one input's pipeline, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Probing,
    Planning,
    Naming,
    Transforming,
    Archiving,
    Cleanup,
}

/// Everything a finished batch reports back to its caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub operation: String,
    pub state: BatchState,
    /// Fraction of queued inputs whose pipeline has returned
    pub progress: f64,
    pub results: Vec<OperationResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

//! Transform engine module
//!
//! Builds transcoder command lines for cut, trim, merge and audio
//! extraction, runs them through the transcoder port and classifies the
//! outcome.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod audio;
pub mod clipper;
pub mod copy;
pub mod merge;
pub mod progress;
pub mod reencode;

pub use clipper::TransformInvoker;
pub use progress::{BatchEvent, ChannelSink, LogSink, MemorySink, NoOpSink, ProgressSink, Reporter};

/// How a cut is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutMode {
    /// Re-mux without re-encoding; cut points snap to keyframes
    StreamCopy,
    /// Full re-encode for frame-accurate boundaries
    Reencode,
}

impl CutMode {
    pub fn from_precise(precise: bool) -> Self {
        if precise {
            Self::Reencode
        } else {
            Self::StreamCopy
        }
    }
}

/// One time range of one input written to one output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutRequest {
    /// Input file path
    pub input: PathBuf,
    /// Output file path
    pub output: PathBuf,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub mode: CutMode,
}

/// Fixed encoder settings for precise cuts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
    /// Encoding preset
    pub preset: String,
    /// CRF quality setting
    pub crf: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "fast".to_string(),
            crf: 23,
        }
    }
}

/// Format a time value the way every cut argument is written
pub(crate) fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

//! Media file inspection module
//!
//! Duration is read by running the transcoder with only an input argument
//! and scanning its diagnostic text. FFmpeg exits non-zero in that mode
//! ("At least one output file must be specified"), so the exit status is
//! ignored and only the text matters.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};

use crate::domain::model::MediaAsset;
use crate::error::{SplitXError, SplitXResult};
use crate::ports::TranscoderPort;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration: (\d{2}):(\d{2}):(\d{2}\.\d{2})").expect("invalid duration regex")
});

/// Extract the `Duration: HH:MM:SS.ff` token from transcoder diagnostics
pub fn parse_duration(diagnostics: &str) -> Option<f64> {
    let caps = DURATION_RE.captures(diagnostics)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Reads source durations through the transcoder
#[derive(Clone)]
pub struct DurationProbe {
    transcoder: Arc<dyn TranscoderPort>,
}

impl DurationProbe {
    pub fn new(transcoder: Arc<dyn TranscoderPort>) -> Self {
        Self { transcoder }
    }

    /// Probe the duration of `path` in seconds.
    ///
    /// A missing path fails with `NotFound` before the transcoder is run.
    pub async fn probe(&self, path: &Path) -> SplitXResult<f64> {
        if !path.exists() {
            return Err(SplitXError::not_found(path));
        }

        let args = vec!["-i".to_string(), path.display().to_string()];
        let output = self.transcoder.run(&args).await?;
        debug!("Probe of {} exited with {:?}", path.display(), output.status);

        parse_duration(&output.stderr).ok_or_else(|| {
            SplitXError::probe(format!(
                "Could not extract duration from FFMPEG. File might be corrupt: {}",
                path.display()
            ))
        })
    }

    /// Open `path` as an asset and attach its probed duration
    pub async fn probe_asset(&self, path: &Path) -> SplitXResult<MediaAsset> {
        let asset = MediaAsset::open(path)?;
        let duration = self.probe(&asset.path).await?;
        info!("Probed {}: {:.2}s", asset.file_name(), duration);
        Ok(asset.with_duration(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FFMPEG_BANNER: &str = "ffmpeg version 6.1 Copyright (c) 2000-2023 the FFmpeg developers\n\
        Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':\n\
        \x20 Duration: 01:02:03.45, start: 0.000000, bitrate: 1205 kb/s\n\
        At least one output file must be specified\n";

    #[test]
    fn duration_parsed_from_banner() {
        assert_eq!(parse_duration(FFMPEG_BANNER), Some(3723.45));
    }

    #[test]
    fn short_duration() {
        assert_eq!(parse_duration("  Duration: 00:02:05.00, start"), Some(125.0));
    }

    #[test]
    fn missing_duration_token() {
        assert_eq!(parse_duration("clip.mp4: Invalid data found when processing input"), None);
    }

    #[test]
    fn unknown_duration_is_not_parsed() {
        assert_eq!(parse_duration("Duration: N/A, bitrate: N/A"), None);
    }
}

//! Re-encoding clipping implementation for frame-accurate cuts

use crate::engine::{format_seconds, CutRequest, EncodeSettings};

/// Re-encoding clipper used in precise mode
#[derive(Debug, Clone, Default)]
pub struct ReencodeClipper {
    settings: EncodeSettings,
}

impl ReencodeClipper {
    /// Create a new re-encoding clipper with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the encoding preset (ultrafast, fast, medium, slow, veryslow)
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.settings.preset = preset.into();
        self
    }

    /// Set constant rate factor for quality-based encoding
    pub fn with_crf(mut self, crf: u8) -> Self {
        self.settings.crf = crf.min(51); // Clamp to valid range
        self
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }

    /// Transcoder arguments for a re-encoded cut
    pub fn args(&self, request: &CutRequest) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            request.input.display().to_string(),
            "-ss".to_string(),
            format_seconds(request.start),
            "-to".to_string(),
            format_seconds(request.end),
            "-c:v".to_string(),
            self.settings.video_codec.clone(),
            "-c:a".to_string(),
            self.settings.audio_codec.clone(),
            "-preset".to_string(),
            self.settings.preset.clone(),
            "-crf".to_string(),
            self.settings.crf.to_string(),
            request.output.display().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CutMode;

    fn request() -> CutRequest {
        CutRequest {
            input: "/in/clip.mp4".into(),
            output: "/out/clip_trimmed.mp4".into(),
            start: 12.5,
            end: 30.0,
            mode: CutMode::Reencode,
        }
    }

    #[test]
    fn reencode_args_use_fixed_quality() {
        assert_eq!(
            ReencodeClipper::new().args(&request()),
            vec![
                "-y", "-i", "/in/clip.mp4", "-ss", "12.500", "-to", "30.000", "-c:v", "libx264",
                "-c:a", "aac", "-preset", "fast", "-crf", "23", "/out/clip_trimmed.mp4"
            ]
        );
    }

    #[test]
    fn crf_is_clamped() {
        let clipper = ReencodeClipper::new().with_crf(80).with_preset("medium");
        assert_eq!(clipper.settings().crf, 51);
        assert_eq!(clipper.settings().preset, "medium");
    }
}

//! Stream copy implementation

use crate::engine::{format_seconds, CutRequest};

/// Stream copy clipper for fast, keyframe-snapped cuts
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamCopyClipper;

impl StreamCopyClipper {
    /// Create a new stream copy clipper
    pub fn new() -> Self {
        Self
    }

    /// Transcoder arguments for a stream-copy cut
    pub fn args(&self, request: &CutRequest) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            request.input.display().to_string(),
            "-ss".to_string(),
            format_seconds(request.start),
            "-to".to_string(),
            format_seconds(request.end),
            "-c".to_string(),
            "copy".to_string(),
            request.output.display().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CutMode;

    #[test]
    fn copy_args_use_stream_copy() {
        let request = CutRequest {
            input: "/in/clip.mp4".into(),
            output: "/out/clip_part1.mp4".into(),
            start: 0.0,
            end: 41.6666666,
            mode: CutMode::StreamCopy,
        };
        assert_eq!(
            StreamCopyClipper::new().args(&request),
            vec![
                "-y", "-i", "/in/clip.mp4", "-ss", "0.000", "-to", "41.667", "-c", "copy",
                "/out/clip_part1.mp4"
            ]
        );
    }
}

//! Audio extraction arguments

use std::path::Path;

use crate::domain::model::AudioFormat;

/// Audio bitrate used for lossy output
pub const AUDIO_BITRATE: &str = "192k";
/// Output sample rate
pub const AUDIO_SAMPLE_RATE: &str = "44100";

/// Transcoder arguments that drop the video stream and encode audio only
pub fn extract_args(input: &Path, format: AudioFormat, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-vn".to_string(),
        "-acodec".to_string(),
        format.codec().to_string(),
        "-ab".to_string(),
        AUDIO_BITRATE.to_string(),
        "-ar".to_string(),
        AUDIO_SAMPLE_RATE.to_string(),
        output.display().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp3_uses_lame() {
        let args = extract_args(Path::new("/v/a.mp4"), AudioFormat::Mp3, Path::new("/v/a.mp3"));
        assert_eq!(
            args,
            vec!["-y", "-i", "/v/a.mp4", "-vn", "-acodec", "libmp3lame", "-ab", "192k", "-ar", "44100", "/v/a.mp3"]
        );
    }

    #[test]
    fn wav_uses_pcm() {
        let args = extract_args(Path::new("/v/a.mp4"), AudioFormat::Wav, Path::new("/v/a.wav"));
        assert_eq!(args[5], "pcm_s16le");
        assert_eq!(args.last().map(String::as_str), Some("/v/a.wav"));
    }
}

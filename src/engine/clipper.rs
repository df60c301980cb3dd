//! Transform invoker: turns cut/trim/merge/extract intents into transcoder runs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use crate::domain::model::{AudioFormat, MediaAsset};
use crate::domain::rules::{MergeRules, TrimRules};
use crate::engine::audio::extract_args;
use crate::engine::copy::StreamCopyClipper;
use crate::engine::merge::{concat_args, ConcatManifest};
use crate::engine::progress::Reporter;
use crate::engine::reencode::ReencodeClipper;
use crate::engine::{CutMode, CutRequest};
use crate::error::{SplitXError, SplitXResult};
use crate::ports::TranscoderPort;
use crate::probe::DurationProbe;

/// Container extension for every video output
pub const VIDEO_EXTENSION: &str = "mp4";

/// Runs transcoder invocations for every transform operation
#[derive(Clone)]
pub struct TransformInvoker {
    transcoder: Arc<dyn TranscoderPort>,
    probe: DurationProbe,
    copy_clipper: StreamCopyClipper,
    reencode_clipper: ReencodeClipper,
}

impl TransformInvoker {
    /// Create a new invoker over the given transcoder
    pub fn new(transcoder: Arc<dyn TranscoderPort>) -> Self {
        Self {
            probe: DurationProbe::new(Arc::clone(&transcoder)),
            transcoder,
            copy_clipper: StreamCopyClipper::new(),
            reencode_clipper: ReencodeClipper::new(),
        }
    }

    /// Build the argument vector for a cut
    pub fn cut_args(&self, request: &CutRequest) -> Vec<String> {
        match request.mode {
            CutMode::StreamCopy => self.copy_clipper.args(request),
            CutMode::Reencode => self.reencode_clipper.args(request),
        }
    }

    /// Write one time range of an input to one output
    pub async fn cut(&self, request: &CutRequest) -> SplitXResult<PathBuf> {
        let started = Instant::now();
        debug!(
            "Cut {} [{:.3}s - {:.3}s] -> {} ({:?})",
            request.input.display(),
            request.start,
            request.end,
            request.output.display(),
            request.mode
        );

        self.execute(&self.cut_args(request)).await?;

        debug!("Cut finished in {:.2}s", started.elapsed().as_secs_f64());
        Ok(request.output.clone())
    }

    /// Trim an input to `[start, end]`, writing `<stem>_trimmed.mp4` into `output_dir`.
    ///
    /// An end past the probed duration is clamped with a warning.
    pub async fn trim(
        &self,
        asset: &MediaAsset,
        start: f64,
        end: f64,
        precise: bool,
        output_dir: &Path,
        reporter: &Reporter,
    ) -> SplitXResult<PathBuf> {
        TrimRules::validate_range(start, end)?;

        let duration = match asset.duration {
            Some(duration) => duration,
            None => self.probe.probe(&asset.path).await?,
        };
        let (effective_end, clamped) = TrimRules::clamp_end(start, end, duration)?;
        if clamped {
            reporter.warn(format!(
                "Warning: End time ({}s) exceeds video duration ({:.2}s). Using {:.2}s instead.",
                end, duration, effective_end
            ));
        }
        let end = effective_end;

        std::fs::create_dir_all(output_dir)?;
        let output_name = format!("{}_trimmed.{}", asset.stem, VIDEO_EXTENSION);
        let output = output_dir.join(&output_name);

        reporter.log(format!("Trimming {}: {}s to {}s", asset.file_name(), start, end));
        let mode = CutMode::from_precise(precise);
        if mode == CutMode::Reencode {
            reporter.log("Re-encoding (Precise Mode)...");
        }

        self.cut(&CutRequest {
            input: asset.path.clone(),
            output: output.clone(),
            start,
            end,
            mode,
        })
        .await?;

        reporter.progress(1.0);
        reporter.log(format!("Trim complete: {}", output_name));
        Ok(output)
    }

    /// Strip the video stream, writing `<stem>.<format>` into `output_dir`
    pub async fn extract_audio(
        &self,
        asset: &MediaAsset,
        format: AudioFormat,
        output_dir: &Path,
        reporter: &Reporter,
    ) -> SplitXResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let output_name = format!("{}.{}", asset.stem, format.extension());
        let output = output_dir.join(&output_name);
        if output == asset.path {
            return Err(SplitXError::validation(format!(
                "Audio output would overwrite the input: {}",
                output.display()
            )));
        }

        reporter.log(format!("Extracting audio from {}...", asset.file_name()));
        self.execute(&extract_args(&asset.path, format, &output)).await?;

        reporter.progress(1.0);
        reporter.log(format!("Audio extracted: {}", output_name));
        Ok(output)
    }

    /// Concatenate `inputs` in order into `output` with stream copy.
    ///
    /// The concat manifest is removed whether or not the transcoder succeeds.
    /// Codec or resolution mismatches surface only as a transcoder failure.
    pub async fn merge(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        reporter: &Reporter,
    ) -> SplitXResult<PathBuf> {
        MergeRules::validate_inputs(inputs)?;
        for input in inputs {
            if !input.exists() {
                return Err(SplitXError::not_found(input));
            }
        }

        let output = std::path::absolute(output)?;
        let output_dir = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&output_dir)?;

        let manifest = ConcatManifest::create(&output_dir, inputs)?;
        reporter.log(format!("Created concat list with {} files", manifest.len()));
        reporter.log("Merging videos...");

        let result = self.execute(&concat_args(manifest.path(), &output)).await;
        if let Err(e) = manifest.close() {
            warn!("Could not remove concat manifest: {}", e);
        }
        result?;

        reporter.progress(1.0);
        let output_name = output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        reporter.log(format!("Merge complete: {}", output_name));
        Ok(output)
    }

    /// Run the transcoder and turn a non-zero exit into `Transcode`
    async fn execute(&self, args: &[String]) -> SplitXResult<()> {
        let output = self.transcoder.run(args).await?;
        if output.success {
            return Ok(());
        }

        let message = match output.status {
            Some(code) => format!("FFMPEG Error (exit status {})", code),
            None => "FFMPEG Error (terminated by signal)".to_string(),
        };
        error!("{} running {}", message, self.transcoder.binary().display());
        Err(SplitXError::Transcode {
            message,
            stderr: output.stderr,
        })
    }

    /// Underlying probe, shared with the orchestrator
    pub fn probe(&self) -> &DurationProbe {
        &self.probe
    }

    /// Transcoder executable in use
    pub fn binary(&self) -> &Path {
        self.transcoder.binary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TranscodeOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FailingTranscoder {
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl TranscoderPort for FailingTranscoder {
        async fn run(&self, args: &[String]) -> SplitXResult<TranscodeOutput> {
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(TranscodeOutput {
                status: Some(1),
                success: false,
                stderr: "Conversion failed!\n".to_string(),
            })
        }

        fn binary(&self) -> &Path {
            Path::new("ffmpeg")
        }
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_transcode_error_with_diagnostics() {
        let transcoder = Arc::new(FailingTranscoder {
            calls: Mutex::new(Vec::new()),
        });
        let invoker = TransformInvoker::new(transcoder.clone());
        let err = invoker
            .cut(&CutRequest {
                input: "/in/a.mp4".into(),
                output: "/out/a_part1.mp4".into(),
                start: 0.0,
                end: 5.0,
                mode: CutMode::StreamCopy,
            })
            .await
            .unwrap_err();

        match err {
            SplitXError::Transcode { message, stderr } => {
                assert!(message.contains("exit status 1"));
                assert_eq!(stderr, "Conversion failed!\n");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(transcoder.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn merge_with_one_input_never_runs_the_transcoder() {
        let transcoder = Arc::new(FailingTranscoder {
            calls: Mutex::new(Vec::new()),
        });
        let invoker = TransformInvoker::new(transcoder.clone());
        let err = invoker
            .merge(&[PathBuf::from("/in/a.mp4")], Path::new("/out/m.mp4"), &Reporter::silent())
            .await
            .unwrap_err();
        assert!(matches!(err, SplitXError::Validation { .. }));
        assert!(transcoder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn cut_args_follow_mode() {
        let transcoder = Arc::new(FailingTranscoder {
            calls: Mutex::new(Vec::new()),
        });
        let invoker = TransformInvoker::new(transcoder);
        let mut request = CutRequest {
            input: "/in/a.mp4".into(),
            output: "/out/a.mp4".into(),
            start: 1.0,
            end: 2.0,
            mode: CutMode::StreamCopy,
        };
        assert!(invoker.cut_args(&request).contains(&"copy".to_string()));
        request.mode = CutMode::Reencode;
        assert!(invoker.cut_args(&request).contains(&"libx264".to_string()));
    }
}

//! FFmpeg execution adapter
//!
//! Spawns the transcoder binary as a child process and captures its exit
//! status and stderr. The binary path is resolved once by the caller and
//! handed in; nothing here looks it up.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{SplitXError, SplitXResult};
use crate::ports::{TranscodeOutput, TranscoderPort};

/// Keep only the last N bytes of stderr to avoid unbounded memory growth.
const MAX_STDERR_BYTES: usize = 64 * 1024;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Process-backed transcoder adapter
#[derive(Debug, Clone)]
pub struct FfmpegProcessAdapter {
    binary: PathBuf,
}

impl FfmpegProcessAdapter {
    /// Create an adapter driving the executable at `binary`
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl TranscoderPort for FfmpegProcessAdapter {
    async fn run(&self, args: &[String]) -> SplitXResult<TranscodeOutput> {
        let input_arg = args
            .iter()
            .position(|a| a == "-i")
            .and_then(|i| args.get(i + 1));
        debug!(
            "Spawning transcoder: path={}, input={:?}, output={:?}",
            self.binary.display(),
            input_arg,
            args.last()
        );

        let mut cmd = Command::new(&self.binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let output = cmd.output().await.map_err(|e| SplitXError::Transcode {
            message: format!("Failed to spawn {}", self.binary.display()),
            stderr: e.to_string(),
        })?;

        let stderr = tail_lossy(&output.stderr, MAX_STDERR_BYTES);
        debug!(
            "Transcoder exited: status={:?}, stderr_bytes={}",
            output.status.code(),
            output.stderr.len()
        );

        Ok(TranscodeOutput {
            status: output.status.code(),
            success: output.status.success(),
            stderr,
        })
    }

    fn binary(&self) -> &Path {
        &self.binary
    }
}

/// Decode the trailing `max` bytes of `bytes`, replacing invalid UTF-8
fn tail_lossy(bytes: &[u8], max: usize) -> String {
    let start = bytes.len().saturating_sub(max);
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

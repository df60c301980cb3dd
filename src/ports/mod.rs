// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::error::SplitXResult;

/// What the external transcoder reports back for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscodeOutput {
    /// Exit code, if the process exited normally
    pub status: Option<i32>,
    /// Whether the process exited with status zero
    pub success: bool,
    /// Diagnostic text written to stderr
    pub stderr: String,
}

/// Port for running the external media transcoder.
///
/// Arguments go in, exit status and diagnostic text come out. Implementations
/// must not interpret the exit status; callers decide what counts as failure.
#[async_trait]
pub trait TranscoderPort: Send + Sync {
    /// Run the transcoder with the given arguments and wait for it to exit
    async fn run(&self, args: &[String]) -> SplitXResult<TranscodeOutput>;

    /// Path of the executable being driven
    fn binary(&self) -> &Path;
}

//! Concat manifest handling for merges
//!
//! The manifest is a temporary file owned by `ConcatManifest`; dropping the
//! value removes it from disk on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::SplitXResult;

/// Temporary ordered list of inputs for the concat demuxer
pub struct ConcatManifest {
    file: NamedTempFile,
    entries: usize,
}

impl ConcatManifest {
    /// Write a manifest into `dir` listing `inputs` by absolute path, in order
    pub fn create(dir: &Path, inputs: &[PathBuf]) -> SplitXResult<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("concat_list")
            .suffix(".txt")
            .tempfile_in(dir)?;

        let body = render(inputs)?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        debug!("Wrote concat manifest {}", file.path().display());

        Ok(Self {
            file,
            entries: inputs.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Remove the manifest now, surfacing any deletion error
    pub fn close(self) -> SplitXResult<()> {
        self.file.close()?;
        Ok(())
    }
}

/// Manifest body: one `file '<absolute path>'` line per input
pub fn render(inputs: &[PathBuf]) -> SplitXResult<String> {
    let mut body = String::new();
    for input in inputs {
        let absolute = std::path::absolute(input)?;
        body.push_str("file '");
        body.push_str(&escape(&absolute.display().to_string()));
        body.push_str("'\n");
    }
    Ok(body)
}

/// Single quotes inside a quoted concat path are written as `'\''`
fn escape(path: &str) -> String {
    path.replace('\'', r"'\''")
}

/// Transcoder arguments for a stream-copy concatenation
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.display().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        output.display().to_string(),
    ]
}

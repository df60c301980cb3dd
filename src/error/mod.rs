//! Error handling module for SplitX

use thiserror::Error;

/// Main error type for SplitX operations
#[derive(Error, Debug)]
pub enum SplitXError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    NotFound { path: String },

    /// Out-of-range or conflicting parameters
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Duration could not be read from the transcoder diagnostics
    #[error("Failed to probe media file: {message}")]
    Probe { message: String },

    /// Transcoder exited non-zero or could not be started
    #[error("{message}: {stderr}")]
    Transcode { message: String, stderr: String },

    /// Request rejected before any transcoder invocation
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Archive could not be written
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl SplitXError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    pub fn not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::NotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Single-line description suitable for a log line.
    ///
    /// Transcoder failures keep only the last non-empty diagnostic line, which
    /// is where FFmpeg reports the actual cause.
    pub fn detail(&self) -> String {
        match self {
            Self::Transcode { message, stderr } => {
                match stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
                    Some(last) => format!("{}: {}", message, last),
                    None => message.clone(),
                }
            }
            other => other.to_string().replace(['\r', '\n'], " "),
        }
    }

    /// Short machine-friendly tag for the error category
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Config { .. } => "config",
            Self::Probe { .. } => "probe",
            Self::Transcode { .. } => "transcode",
            Self::Validation { .. } => "validation",
            Self::Archive { .. } | Self::Zip(_) => "archive",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias for SplitX operations
pub type SplitXResult<T> = std::result::Result<T, SplitXError>;

//! Diagnostic logging setup
//!
//! Diagnostics go to stderr so stdout stays free for the lifecycle log
//! and `--json` reports.

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::error::SplitXError;

/// Output format of the diagnostic log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = SplitXError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(SplitXError::config(format!(
                "Unknown log format '{}' (expected pretty or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        })
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise `level`.
///
/// The lifecycle mirror target is kept at `warn` unless asked for, since
/// the CLI already prints those lines to stdout.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = format!("{},splitx::log=warn", level.trim());
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info,splitx::log=warn"))
    })
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_logging(level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

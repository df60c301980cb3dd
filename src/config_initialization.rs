//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};
use crate::error::SplitXResult;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "SPLITX_CONFIG";

/// Environment variables and the config keys they override
const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("SPLITX_FFMPEG", "transcoder"),
    ("SPLITX_OUTPUT_DIR", "output_dir"),
    ("SPLITX_NAMING_PATTERN", "naming_pattern"),
    ("SPLITX_SPLIT_MODE", "split_mode"),
    ("SPLITX_SPLIT_COUNT", "split_count"),
    ("SPLITX_SPLIT_DURATION", "split_duration"),
    ("SPLITX_SPLIT_SIZE_MB", "split_size_mb"),
    ("SPLITX_AUDIO_FORMAT", "audio_format"),
    ("SPLITX_ARCHIVE_MODE", "archive_mode"),
    ("SPLITX_CLEANUP", "cleanup"),
    ("SPLITX_PRECISE", "precise"),
    ("SPLITX_LOG_LEVEL", "log_level"),
];

/// Resolve configuration from the process environment.
///
/// Precedence: CLI > environment > file > defaults.
pub fn initialize_configuration(cli: &Cli) -> Result<AppConfig> {
    resolve_configuration(cli, |key| std::env::var(key).ok())
}

/// Resolve configuration with an injected environment lookup
pub fn resolve_configuration<F>(cli: &Cli, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Step 1: defaults
    let mut config = AppConfig::default();

    // Step 2: config file
    let env_path = lookup(CONFIG_ENV).filter(|p| !p.trim().is_empty()).map(PathBuf::from);
    if let Some(path) = TomlConfigAdapter::discover(cli.config.as_deref(), env_path) {
        config = TomlConfigAdapter::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    } else {
        debug!("No configuration file found; using defaults");
    }

    // Step 3: environment variables
    apply_environment_overrides(&mut config, &lookup).context("Invalid SPLITX_* environment value")?;

    // Step 4: command-line flags
    apply_cli_overrides(&mut config, cli);

    info!("Configuration resolved (transcoder: {})", config.transcoder.display());
    Ok(config)
}

/// Apply every `SPLITX_*` variable the lookup knows about
pub fn apply_environment_overrides<F>(config: &mut AppConfig, lookup: F) -> SplitXResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_MAPPINGS {
        if let Some(value) = lookup(var) {
            debug!("Applying {} from environment", var);
            config.set(key, &value)?;
        }
    }
    Ok(())
}

/// Flags given on the command line win over every other source
pub fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.transcoder = ffmpeg.clone();
    }

    match &cli.command {
        Commands::Split(args) => {
            if args.output_dir.is_some() {
                config.output_dir = args.output_dir.clone();
            }
            if args.naming.is_some() {
                config.naming_pattern = args.naming.clone();
            }
            if let Some(mode) = args.archive.as_deref().and_then(|m| m.parse().ok()) {
                config.archive_mode = mode;
            }
            config.cleanup |= args.cleanup;
            config.precise |= args.precise;
        }
        Commands::Trim(args) => {
            if args.output_dir.is_some() {
                config.output_dir = args.output_dir.clone();
            }
            config.precise |= args.precise;
        }
        Commands::ExtractAudio(args) => {
            if args.output_dir.is_some() {
                config.output_dir = args.output_dir.clone();
            }
            if let Some(format) = args.format.as_deref().and_then(|f| f.parse().ok()) {
                config.audio_format = format;
            }
        }
        Commands::Merge(_) | Commands::Probe(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ArchiveMode, AudioFormat};
    use clap::Parser;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn environment_overrides_file_and_cli_overrides_environment() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(&file, "archive_mode = \"none\"\nlog_level = \"debug\"\nffmpeg = \"/file/ffmpeg\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "splitter",
            "--config",
            file.to_str().unwrap(),
            "--ffmpeg",
            "/cli/ffmpeg",
            "extract-audio",
            "a.mp4",
        ])
        .unwrap();

        let config = resolve_configuration(
            &cli,
            env(&[("SPLITX_ARCHIVE_MODE", "per-file"), ("SPLITX_FFMPEG", "/env/ffmpeg"), ("SPLITX_AUDIO_FORMAT", "wav")]),
        )
        .unwrap();

        assert_eq!(config.archive_mode, ArchiveMode::PerFile);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.transcoder, PathBuf::from("/cli/ffmpeg"));
        assert_eq!(config.audio_format, AudioFormat::Wav);
    }

    #[test]
    fn config_file_from_environment() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("env.toml");
        std::fs::write(&file, "[splitx]\nsplit_count = 4\n").unwrap();

        let cli = Cli::try_parse_from(["splitter", "probe", "a.mp4"]).unwrap();
        let config = resolve_configuration(&cli, env(&[("SPLITX_CONFIG", file.to_str().unwrap())])).unwrap();
        assert_eq!(config.split_count, 4);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let cli = Cli::try_parse_from(["splitter", "--config", "/no/such/splitx.toml", "probe", "a.mp4"]).unwrap();
        assert!(resolve_configuration(&cli, env(&[])).is_err());
    }

    #[test]
    fn bad_environment_value_is_an_error() {
        let mut config = AppConfig::default();
        let err = apply_environment_overrides(&mut config, env(&[("SPLITX_CLEANUP", "maybe")]));
        assert!(err.is_err());
    }

    #[test]
    fn split_flags_override_config() {
        let cli = Cli::try_parse_from([
            "splitter", "split", "a.mp4", "--parts", "3", "--archive", "none", "--cleanup", "--naming", "{name}-{num}",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.archive_mode, ArchiveMode::None);
        assert!(config.cleanup);
        assert_eq!(config.naming_pattern.as_deref(), Some("{name}-{num}"));
    }
}

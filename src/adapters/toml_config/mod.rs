// TOML config adapter - Configuration loading from TOML (or legacy JSON) files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::{ArchiveMode, AudioFormat, SizingStrategy, SplitMode};
use crate::error::{SplitXError, SplitXResult};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "splitx.toml";

/// Resolved application configuration.
///
/// The core never reads this directly; front ends turn it into request
/// values before a batch starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Transcoder executable
    #[serde(alias = "ffmpeg")]
    pub transcoder: PathBuf,
    /// Custom output directory (defaults to each input's directory)
    pub output_dir: Option<PathBuf>,
    /// Output naming template for split parts
    pub naming_pattern: Option<String>,
    pub split_mode: SplitMode,
    pub split_count: u32,
    pub split_duration: Option<f64>,
    pub split_size_mb: Option<f64>,
    pub audio_format: AudioFormat,
    pub archive_mode: ArchiveMode,
    pub cleanup: bool,
    pub precise: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            transcoder: PathBuf::from("ffmpeg"),
            output_dir: None,
            naming_pattern: None,
            split_mode: SplitMode::Count,
            split_count: 2,
            split_duration: None,
            split_size_mb: None,
            audio_format: AudioFormat::Mp3,
            archive_mode: ArchiveMode::Bundle,
            cleanup: false,
            precise: false,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Sizing strategy implied by `split_mode` and its matching parameter
    pub fn default_strategy(&self) -> SplitXResult<SizingStrategy> {
        match self.split_mode {
            SplitMode::Count => Ok(SizingStrategy::ByCount(self.split_count)),
            SplitMode::Duration => self
                .split_duration
                .map(SizingStrategy::ByDuration)
                .ok_or_else(|| {
                    SplitXError::config("split_mode is 'duration' but split_duration is not set")
                }),
            SplitMode::Size => self
                .split_size_mb
                .map(SizingStrategy::BySize)
                .ok_or_else(|| {
                    SplitXError::config("split_mode is 'size' but split_size_mb is not set")
                }),
        }
    }

    /// Apply one `key = value` override given as strings
    pub fn set(&mut self, key: &str, value: &str) -> SplitXResult<()> {
        let bad = |what: &str| SplitXError::config(format!("Invalid {} value '{}'", what, value));
        match key {
            "transcoder" | "ffmpeg" => self.transcoder = PathBuf::from(value),
            "output_dir" => self.output_dir = non_empty(value).map(PathBuf::from),
            "naming_pattern" => self.naming_pattern = non_empty(value).map(str::to_string),
            "split_mode" => self.split_mode = value.parse()?,
            "split_count" => self.split_count = value.trim().parse().map_err(|_| bad(key))?,
            "split_duration" => {
                self.split_duration = Some(value.trim().parse().map_err(|_| bad(key))?)
            }
            "split_size_mb" => {
                self.split_size_mb = Some(value.trim().parse().map_err(|_| bad(key))?)
            }
            "audio_format" => self.audio_format = value.parse()?,
            "archive_mode" => self.archive_mode = value.parse()?,
            "cleanup" => self.cleanup = parse_flag(value).ok_or_else(|| bad(key))?,
            "precise" => self.precise = parse_flag(value).ok_or_else(|| bad(key))?,
            "log_level" => self.log_level = value.trim().to_string(),
            other => {
                return Err(SplitXError::config(format!(
                    "Unknown configuration key '{}'",
                    other
                )))
            }
        }
        debug!("Set config {} = {}", key, value);
        Ok(())
    }
}

/// Loads `AppConfig` from disk
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Load a config file. `.json` files are read as the flat settings
    /// document used by the desktop front end; anything else is TOML.
    pub fn load(path: &Path) -> SplitXResult<AppConfig> {
        if !path.exists() {
            return Err(SplitXError::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::parse_json(&content)?
        } else {
            Self::parse_toml(&content)?
        };
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse TOML content. Keys may sit at the top level or under `[splitx]`.
    pub fn parse_toml(content: &str) -> SplitXResult<AppConfig> {
        let value: toml::Value = toml::from_str(content)
            .map_err(|e| SplitXError::config(format!("Failed to parse TOML config: {}", e)))?;

        let table = match value.get("splitx") {
            Some(section) => section.clone(),
            None => value,
        };
        table
            .try_into()
            .map_err(|e| SplitXError::config(format!("Invalid TOML config: {}", e)))
    }

    /// Parse the JSON settings document
    pub fn parse_json(content: &str) -> SplitXResult<AppConfig> {
        serde_json::from_str(content)
            .map_err(|e| SplitXError::config(format!("Failed to parse JSON settings: {}", e)))
    }

    /// Config file used when none is named explicitly
    pub fn discover(explicit: Option<&Path>, env_path: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = env_path {
            return Some(path);
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_top_level_toml() {
        let config = TomlConfigAdapter::parse_toml(
            r#"
            transcoder = "/opt/ffmpeg/bin/ffmpeg"
            split_mode = "duration"
            split_duration = 60.0
            archive_mode = "per-file"
            cleanup = true
            "#,
        )
        .unwrap();

        assert_eq!(config.transcoder, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.archive_mode, ArchiveMode::PerFile);
        assert!(config.cleanup);
        assert_eq!(config.default_strategy().unwrap(), SizingStrategy::ByDuration(60.0));
        // untouched keys keep their defaults
        assert_eq!(config.split_count, 2);
        assert_eq!(config.audio_format, AudioFormat::Mp3);
    }

    #[test]
    fn parses_sectioned_toml() {
        let config = TomlConfigAdapter::parse_toml("[splitx]\nsplit_count = 5\n").unwrap();
        assert_eq!(config.default_strategy().unwrap(), SizingStrategy::ByCount(5));
    }

    #[test]
    fn parses_json_settings_and_ignores_theme() {
        let config = TomlConfigAdapter::parse_json(
            r#"{"theme": "Dark", "output_dir": "/tmp/out", "naming_pattern": "{name}-{num}",
                "split_mode": "count", "split_count": 4, "audio_format": "wav"}"#,
        )
        .unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.naming_pattern.as_deref(), Some("{name}-{num}"));
        assert_eq!(config.split_count, 4);
        assert_eq!(config.audio_format, AudioFormat::Wav);
    }

    #[test]
    fn size_mode_without_size_is_a_config_error() {
        let config = AppConfig {
            split_mode: SplitMode::Size,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.default_strategy(),
            Err(SplitXError::Config { .. })
        ));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(config.set("split_count", "many").is_err());
        assert!(config.set("cleanup", "maybe").is_err());
        assert!(config.set("colour", "blue").is_err());
        config.set("cleanup", "yes").unwrap();
        assert!(config.cleanup);
        config.set("output_dir", "  ").unwrap();
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = TomlConfigAdapter::load(Path::new("/no/such/splitx.toml")).unwrap_err();
        assert!(matches!(err, SplitXError::Config { .. }));
    }
}

//! Configuration system
//!
//! Provides layered configuration with:
//! - Runtime defaults
//! - Config file loading (optional, `basic` feature)
//! - Environment variable overrides
//! - Validation

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Source data configuration
    pub store: StoreConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_directory: PathBuf,
    pub file_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub date_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "WARN".to_string(),
            format: "pretty".to_string(),
            output: "console".to_string(),
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data"),
            file_extension: crate::file_discovery::DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_pretty: false,
            date_format: crate::field_parser::DATE_FORMAT.to_string(),
        }
    }
}

const LOG_FORMATS: &[&str] = &["pretty", "json"];
const LOG_OUTPUTS: &[&str] = &["console", "file", "both"];
const GLOB_METACHARACTERS: &[char] = &['*', '?', '[', ']', '/'];

/// Display formats are applied to call dates only, so time or zone
/// specifiers (`%H`, `%p`, `%z`, ...) are rejected along with malformed ones.
fn validate_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(anyhow::anyhow!("Invalid date format: {:?}", format));
    }

    let mut rendered = String::new();
    write!(rendered, "{}", NaiveDate::MIN.format(format))
        .map_err(|_| anyhow::anyhow!("Date format {:?} needs more than a calendar date", format))?;

    Ok(())
}

impl Config {
    /// Load configuration from defaults, file, and environment
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        #[cfg(feature = "basic")]
        {
            let config_paths = [
                PathBuf::from("cdr-store.toml"),
                PathBuf::from(".cdr-store.toml"),
                dirs::config_dir()
                    .map(|d| d.join("cdr-store").join("config.toml"))
                    .unwrap_or_default(),
            ];

            for path in &config_paths {
                if path.is_file() {
                    config = Self::load_from_file(path)?;
                    break;
                }
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    #[cfg(feature = "basic")]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }
        if let Ok(val) = env::var("CDR_LOG_DIR") {
            self.logging.directory = PathBuf::from(val);
        }

        // Store overrides
        if let Ok(val) = env::var("CDR_DATA_DIR") {
            self.store.data_directory = PathBuf::from(val);
        }
        if let Ok(val) = env::var("CDR_FILE_EXTENSION") {
            self.store.file_extension = val;
        }

        // Output overrides
        if let Ok(val) = env::var("CDR_JSON_PRETTY") {
            self.output.json_pretty = val.parse().context("Invalid CDR_JSON_PRETTY")?;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.store.file_extension.trim_start_matches('.').trim().is_empty() {
            return Err(anyhow::anyhow!("File extension must not be empty"));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log format {:?}, expected one of {:?}",
                self.logging.format,
                LOG_FORMATS
            ));
        }

        if !LOG_OUTPUTS.contains(&self.logging.output.as_str()) {
            return Err(anyhow::anyhow!(
                "Unknown log output {:?}, expected one of {:?}",
                self.logging.output,
                LOG_OUTPUTS
            ));
        }

        if self.store.file_extension.contains(GLOB_METACHARACTERS) {
            return Err(anyhow::anyhow!(
                "File extension {:?} must not contain glob metacharacters",
                self.store.file_extension
            ));
        }

        validate_date_format(&self.output.date_format)?;

        Ok(())
    }

    /// Report where the configuration came from and anything suspicious in
    /// it. Runs after logging is initialised, since `load` happens before.
    pub fn log_summary(&self) {
        match &self.source {
            Some(path) => info!(config_file = %path.display(), "Loaded configuration from file"),
            None => info!("No configuration file found, using defaults"),
        }

        if !self.store.data_directory.is_dir() {
            warn!(
                data_directory = %self.store.data_directory.display(),
                "Configured data directory does not exist yet"
            );
        }
    }

    /// Save current configuration to file
    #[cfg(feature = "basic")]
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        info!(path = %path.display(), "Configuration saved to file");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "WARN");
        assert_eq!(config.store.file_extension, "csv");
        assert_eq!(config.store.data_directory, PathBuf::from("data"));
        assert_eq!(config.output.date_format, "%d/%m/%Y");
        assert!(!config.output.json_pretty);
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.store.file_extension = ".".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.output.date_format = "%Y-%m-%".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_format_with_time_fields_is_rejected() {
        let mut config = Config::default();

        for format in ["%d/%m/%Y %H:%M", "%Y-%m-%d %p", "%d %b %Y %z"] {
            config.output.date_format = format.to_string();
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains(format), "{format}: {err}");
        }

        config.output.date_format = "%A %e %B %Y".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extension_with_glob_metacharacters_is_rejected() {
        let mut config = Config::default();

        for extension in ["*", "c[sv", "cs?", "csv/x"] {
            config.store.file_extension = extension.to_string();
            assert!(config.validate().is_err(), "{extension} accepted");
        }
    }
}

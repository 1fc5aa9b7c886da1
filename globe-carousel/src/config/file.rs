//! Loading and saving [`ViewerConfig`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use crate::cycling::CyclingConfig;
use crate::loader::{LoaderConfig, RetryPolicy};
use crate::logging::{default_log_dir, default_log_file};

/// Errors from reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// Where log output goes.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(default_log_dir()),
            file: default_log_file().to_string(),
        }
    }
}

/// Everything a viewer needs to start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerConfig {
    pub cycling: CyclingConfig,
    pub loader: LoaderConfig,
    pub logging: LoggingSettings,
}

impl ViewerConfig {
    /// Load from the default path (~/.globe-carousel/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Write to `path`, creating the parent directory if needed.
    ///
    /// The API key is only written when one is configured.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
            }
        }

        self.to_ini()
            .write_to_file(path)
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        let cycling = &self.cycling;
        ini.with_section(Some("cycling"))
            .set("interval_ms", cycling.cycle_interval.as_millis().to_string())
            .set("idle_timeout_ms", cycling.idle_timeout.as_millis().to_string())
            .set("auto_start", cycling.auto_start.to_string())
            .set("timeout_prevented", cycling.timeout_prevented.to_string())
            .set("recent_bound", cycling.recent_bound.to_string());
        if let Some(region) = cycling.region {
            ini.with_section(Some("cycling")).set("region", region.as_str());
        }

        let loader = &self.loader;
        ini.with_section(Some("map"))
            .set("load_timeout_secs", loader.load_timeout.as_secs().to_string())
            .set("max_attempts", loader.retry.max_attempts().to_string());
        if let RetryPolicy::Linear { base_delay, .. } = &loader.retry {
            ini.with_section(Some("map"))
                .set("retry_base_delay_ms", base_delay.as_millis().to_string());
        }
        if let Some(key) = &loader.api_key {
            ini.with_section(Some("map")).set("api_key", key.as_str());
        }

        ini.with_section(Some("logging"))
            .set("directory", self.logging.directory.to_string_lossy().to_string())
            .set("file", self.logging.file.as_str());

        ini
    }
}

/// Get the config directory (~/.globe-carousel).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".globe-carousel")
}

/// Get the path to the config file (~/.globe-carousel/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

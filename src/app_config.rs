use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::providers::ProviderId;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Provider used when the command line does not pick one
    #[serde(default)]
    pub default_provider: ProviderId,

    /// Source language code
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Max concurrent translation requests within one file
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Max characters per translation request
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Directory for translated outputs, next to each input when empty
    #[serde(default)]
    pub output_directory: String,

    /// Keep partial artifacts when a file fails
    #[serde(default)]
    pub keep_intermediate: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "zh".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_max_workers() -> usize {
    4
}

fn default_max_chunk_size() -> usize {
    1000
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_provider: ProviderId::default(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            max_workers: default_max_workers(),
            max_chunk_size: default_max_chunk_size(),
            output_directory: String::new(),
            keep_intermediate: false,
            request_timeout_secs: default_request_timeout_secs(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _source_name = crate::languages::get_language_name(&self.source_language)?;
        let _target_name = crate::languages::get_language_name(&self.target_language)?;

        if self.source_language == self.target_language {
            return Err(anyhow!(
                "Source and target language are both '{}'",
                self.source_language
            ));
        }
        if self.max_workers == 0 {
            return Err(anyhow!("max_workers must be at least 1"));
        }
        if self.max_chunk_size == 0 {
            return Err(anyhow!("max_chunk_size must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("request_timeout_secs must be at least 1"));
        }

        Ok(())
    }

    /// Load the configuration from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration to a file path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Load the configuration from a file, creating a default one when the
    /// file does not exist yet.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!(
                "Config file not found at '{}', creating default config.",
                path.display()
            );
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }
}

/// Per-user application data directory, shared by the config file and the
/// credential vault.
///
/// Resolution order: config dir, then home dir, then the current directory.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = dirs::config_dir() {
        return dir.join("doctrans");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".doctrans");
    }
    PathBuf::from(".doctrans")
}

/// Default location of the settings file
pub fn default_config_path() -> PathBuf {
    app_data_dir().join("config.json")
}

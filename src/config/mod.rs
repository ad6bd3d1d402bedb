//! Configuration management for treeline
//!
//! Configuration is read from a TOML file and then overridden by command-line
//! arguments.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Completion configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Command history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Display and prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,

    /// Label shown before the current path in the prompt
    #[serde(default = "default_prompt_label")]
    pub prompt_label: String,
}

/// Tab completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Enable tab completion in the interactive shell
    #[serde(default = "default_completion_enabled")]
    pub enabled: bool,
}

/// Command history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Keep history in the file between sessions
    #[serde(default = "default_persist_history")]
    pub persist: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Path to log file (None for stderr)
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Object catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file loaded at startup (None for an empty catalog)
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

// Default value functions
fn default_color_output() -> bool {
    true
}

fn default_prompt_label() -> String {
    "treeline".to_string()
}

fn default_completion_enabled() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".treeline")
        .join("history")
}

fn default_persist_history() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
            prompt_label: default_prompt_label(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: default_completion_enabled(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: default_persist_history(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// A missing file is not an error: defaults are used instead.
    ///
    /// # Arguments
    /// * `path` - Configuration file, or None for the default location
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    ///
    /// # Arguments
    /// * `content` - TOML document
    ///
    /// # Returns
    /// * `Result<Config>` - Parsed configuration or error
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - `~/.treeline/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".treeline")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.display.prompt_label.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "display.prompt_label".to_string(),
                value: self.display.prompt_label.clone(),
            }
            .into());
        }

        if self.history.max_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history.max_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if self.history.persist && self.history.file_path.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "history.file_path".to_string(),
                value: self.history.file_path.display().to_string(),
            }
            .into());
        }

        if let Some(path) = &self.catalog.file_path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
        }

        if let Some(path) = &self.logging.file_path {
            if path.is_dir() {
                return Err(ConfigError::InvalidValue {
                    field: "logging.file_path".to_string(),
                    value: path.display().to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Serialize the configuration as TOML
    ///
    /// # Returns
    /// * `Result<String>` - TOML text or error
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::types::{Config, MAX_FRAME_RATE};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/frameterm/config.toml` on Linux, or the platform
    /// equivalent via `dirs::config_dir()`. Falls back to the current
    /// directory if no config dir is available.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("frameterm").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `Config::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - frame rate is within 1..=240
    /// - the initial grid is at least one cell
    /// - the log filter parses
    pub fn validate(&self) -> Result<(), ConfigError> {
        let frame_rate = self.terminal.frame_rate;
        if frame_rate == 0 || frame_rate > MAX_FRAME_RATE {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "frame_rate must be between 1 and {}, got {}",
                    MAX_FRAME_RATE, frame_rate
                ),
            });
        }

        if self.terminal.initial_rows == 0 || self.terminal.initial_cols == 0 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "initial grid must be at least 1x1, got {}x{}",
                    self.terminal.initial_cols, self.terminal.initial_rows
                ),
            });
        }

        if let Some(program) = &self.shell.program {
            if program.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    message: "shell program must not be empty".to_string(),
                });
            }
        }

        if let Err(err) = EnvFilter::try_new(&self.logging.filter) {
            return Err(ConfigError::ValidationError {
                message: format!("invalid log filter '{}': {}", self.logging.filter, err),
            });
        }

        Ok(())
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::middleware::{ActionRecorder, LoggingMiddleware, Middleware};
use crate::store::State;

/// Upper bound for a bounded recorder, to catch typos like an extra zero.
pub const MAX_RECORDER_CAPACITY: usize = 1_000_000;

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

/// Middleware built from a [`Config`], in pipeline order.
pub struct ConfiguredMiddleware<S> {
    pub middleware: Vec<Box<dyn Middleware<S>>>,
    /// Handle to the installed recorder, if enabled.
    pub recorder: Option<ActionRecorder>,
}

impl Config {
    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

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

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - An enabled recorder's capacity does not exceed [`MAX_RECORDER_CAPACITY`]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recorder.enabled && self.recorder.capacity > MAX_RECORDER_CAPACITY {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Recorder capacity {} exceeds the maximum of {} (use 0 for unbounded)",
                    self.recorder.capacity, MAX_RECORDER_CAPACITY
                ),
            });
        }
        Ok(())
    }

    /// Builds the middleware this configuration enables.
    ///
    /// Logging comes first so it sees every action, including ones a later
    /// layer drops.
    pub fn middleware<S: State>(&self) -> ConfiguredMiddleware<S> {
        let mut middleware: Vec<Box<dyn Middleware<S>>> = Vec::new();

        if self.logging.enabled {
            middleware.push(Box::new(LoggingMiddleware::from_config(&self.logging)));
        }

        let recorder = self.recorder.enabled.then(|| {
            let recorder = ActionRecorder::new(self.recorder.capacity);
            middleware.push(Box::new(recorder.clone()));
            recorder
        });

        ConfiguredMiddleware {
            middleware,
            recorder,
        }
    }
}

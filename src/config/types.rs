use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
}

/// Settings for the action-logging middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Install the logging middleware (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Level of the per-action event (default: debug).
    #[serde(default)]
    pub level: LogLevel,
    /// Include the JSON payload in each event (default: false).
    #[serde(default)]
    pub payloads: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::default(),
            payloads: false,
        }
    }
}

/// Settings for the action recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Install the recorder middleware (default: false).
    #[serde(default)]
    pub enabled: bool,
    /// Number of most recent actions kept; 0 keeps everything (default: 1024).
    #[serde(default = "default_recorder_capacity")]
    pub capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: default_recorder_capacity(),
        }
    }
}

/// `tracing` level used by the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

fn default_true() -> bool {
    true
}

fn default_recorder_capacity() -> usize {
    1024
}

//! Configuration for the built-in middleware.

mod loader;
mod types;

pub use loader::{ConfigError, ConfiguredMiddleware, MAX_RECORDER_CAPACITY};
pub use types::{Config, LogLevel, LoggingConfig, RecorderConfig};

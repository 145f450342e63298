use thiserror::Error;

/// Errors that can occur when turning envelopes back into typed actions.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action type is missing or empty")]
    MissingType,

    #[error("Expected action type '{expected}', found '{found}'")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("Failed to decode payload of '{action_type}': {source}")]
    Payload {
        action_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid action log entry on line {line}: {source}")]
    LogEntry {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

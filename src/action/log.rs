//! JSON-lines action logs.

use super::{ActionError, StandardAction};

/// Ordered list of envelopes, one JSON object per line when serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionLog {
    pub entries: Vec<StandardAction>,
}

impl ActionLog {
    pub fn new(entries: Vec<StandardAction>) -> Self {
        Self { entries }
    }

    /// Parse a log. Blank lines are skipped; line numbers in errors are
    /// 1-based.
    pub fn from_json_lines(content: &str) -> Result<Self, ActionError> {
        let mut entries = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(line).map_err(|source| ActionError::LogEntry {
                line: index + 1,
                source,
            })?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn to_json_lines(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&serde_json::Value::Object(entry.to_dictionary()).to_string());
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

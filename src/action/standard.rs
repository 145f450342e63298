//! The generic action envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;

use super::{Action, ActionError, Payload};

/// Name/payload pair that any action can be expressed as.
///
/// Serialized as `{"type": ..., "payload": ..., "isTypedAction": 0|1}`.
/// Deserializing an entry whose `type` is missing or empty fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStandardAction", into = "RawStandardAction")]
pub struct StandardAction {
    pub action_type: String,
    pub payload: Option<Payload>,
    /// True when this envelope was produced from a concrete typed action.
    pub is_typed_action: bool,
}

impl StandardAction {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
            is_typed_action: false,
        }
    }

    pub fn with_payload(action_type: impl Into<String>, payload: Payload) -> Self {
        Self {
            action_type: action_type.into(),
            payload: Some(payload),
            is_typed_action: false,
        }
    }

    pub fn typed(action_type: impl Into<String>, payload: Option<Payload>) -> Self {
        Self {
            action_type: action_type.into(),
            payload,
            is_typed_action: true,
        }
    }

    /// Decode an envelope from its dictionary form.
    ///
    /// Returns `None` when `type` is missing or empty, or when a field has the
    /// wrong shape.
    pub fn from_dictionary(dictionary: &Payload) -> Option<Self> {
        Self::from_value(Value::Object(dictionary.clone()))
    }

    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Dictionary form, with `isTypedAction` written as `0` or `1`.
    pub fn to_dictionary(&self) -> Payload {
        let mut dictionary = Payload::new();
        dictionary.insert("type".into(), Value::String(self.action_type.clone()));
        dictionary.insert(
            "payload".into(),
            self.payload.clone().map(Value::Object).unwrap_or(Value::Null),
        );
        dictionary.insert(
            "isTypedAction".into(),
            Value::from(u8::from(self.is_typed_action)),
        );
        dictionary
    }

    /// Look up a payload field.
    pub fn payload_value(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref()?.get(key)
    }
}

impl Action for StandardAction {
    fn action_type(&self) -> &str {
        &self.action_type
    }

    fn to_standard_action(&self) -> StandardAction {
        self.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Serialize, Deserialize)]
struct RawStandardAction {
    #[serde(rename = "type", default)]
    action_type: String,
    #[serde(default)]
    payload: Option<Payload>,
    #[serde(rename = "isTypedAction", default, with = "flag")]
    is_typed_action: bool,
}

impl TryFrom<RawStandardAction> for StandardAction {
    type Error = ActionError;

    fn try_from(raw: RawStandardAction) -> Result<Self, Self::Error> {
        if raw.action_type.is_empty() {
            return Err(ActionError::MissingType);
        }
        Ok(Self {
            action_type: raw.action_type,
            payload: raw.payload,
            is_typed_action: raw.is_typed_action,
        })
    }
}

impl From<StandardAction> for RawStandardAction {
    fn from(action: StandardAction) -> Self {
        Self {
            action_type: action.action_type,
            payload: action.payload,
            is_typed_action: action.is_typed_action,
        }
    }
}

/// `isTypedAction` is written as an integer and read from either an integer
/// or a boolean.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Int(i64),
        }

        Ok(match Flag::deserialize(deserializer)? {
            Flag::Bool(value) => value,
            Flag::Int(value) => value != 0,
        })
    }
}

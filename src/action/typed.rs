//! Strongly typed actions and their conversion to and from envelopes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;

use super::{Action, ActionError, Payload, StandardAction};

/// Payload key used when an action does not serialize to a JSON object,
/// e.g. newtype structs like `SetValue(5)`.
const VALUE_KEY: &str = "value";

/// A concrete action type with a stable name.
///
/// Derive `Serialize`/`Deserialize` and name the type; encoding and decoding
/// come for free:
///
/// ```ignore
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct SetValue(i64);
///
/// impl TypedAction for SetValue {
///     const TYPE: &'static str = "SetValue";
/// }
/// ```
pub trait TypedAction:
    Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static
{
    /// Stable type name, used as the envelope's `type`.
    const TYPE: &'static str;

    /// Express this action as an envelope.
    ///
    /// Struct fields become the payload. Values that are not JSON objects are
    /// stored under `"value"`. Actions without data have no payload.
    fn encode(&self) -> StandardAction {
        let payload = match serde_json::to_value(self) {
            Ok(Value::Object(map)) if map.is_empty() => None,
            Ok(Value::Object(map)) => Some(map),
            Ok(Value::Null) => None,
            Ok(other) => {
                let mut map = Payload::new();
                map.insert(VALUE_KEY.into(), other);
                Some(map)
            }
            Err(err) => {
                tracing::warn!(
                    action_type = Self::TYPE,
                    error = %err,
                    "Action payload is not serializable, encoding without payload"
                );
                None
            }
        };
        StandardAction::typed(Self::TYPE, payload)
    }

    /// Rebuild this action from an envelope carrying [`Self::TYPE`].
    fn decode(action: &StandardAction) -> Result<Self, ActionError> {
        if action.action_type != Self::TYPE {
            return Err(ActionError::TypeMismatch {
                expected: Self::TYPE,
                found: action.action_type.clone(),
            });
        }

        let payload_error = |source| ActionError::Payload {
            action_type: action.action_type.clone(),
            source,
        };

        match &action.payload {
            None => serde_json::from_value(Value::Null)
                .or_else(|_| serde_json::from_value(Value::Object(Payload::new())))
                .map_err(payload_error),
            Some(map) => match serde_json::from_value(Value::Object(map.clone())) {
                Ok(decoded) => Ok(decoded),
                Err(err) => match map.get(VALUE_KEY) {
                    Some(value) if map.len() == 1 => {
                        serde_json::from_value(value.clone()).map_err(payload_error)
                    }
                    _ => Err(payload_error(err)),
                },
            },
        }
    }
}

impl<T: TypedAction> Action for T {
    fn action_type(&self) -> &str {
        T::TYPE
    }

    fn to_standard_action(&self) -> StandardAction {
        self.encode()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Dispatched once when a store is created without an initial state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Init;

impl TypedAction for Init {
    const TYPE: &'static str = "@@anyflux/INIT";
}

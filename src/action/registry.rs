//! Lookup table from envelope type names back to typed actions.

use std::collections::HashMap;

use super::{Action, ActionError, Init, StandardAction, TypedAction};

type Decoder = fn(&StandardAction) -> Result<Box<dyn Action>, ActionError>;

/// Registry of the typed actions an application knows how to rebuild.
///
/// Used when replaying recorded envelopes: registered types come back as
/// their concrete action, so reducers that downcast see the real thing.
/// Unknown types are dispatched as the envelope itself.
#[derive(Clone)]
pub struct ActionRegistry {
    decoders: HashMap<&'static str, Decoder>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry {
    /// Create a registry that knows the built-in [`Init`] action.
    pub fn new() -> Self {
        let mut registry = Self {
            decoders: HashMap::new(),
        };
        registry.register::<Init>();
        registry
    }

    pub fn register<A: TypedAction>(&mut self) -> &mut Self {
        if self.decoders.insert(A::TYPE, decode_as::<A>).is_some() {
            tracing::debug!(action_type = A::TYPE, "Replaced action decoder");
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<A: TypedAction>(mut self) -> Self {
        self.register::<A>();
        self
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.decoders.contains_key(action_type)
    }

    /// Turn an envelope into a dispatchable action.
    ///
    /// Fails only when a registered type cannot decode the payload.
    pub fn decode(&self, action: StandardAction) -> Result<Box<dyn Action>, ActionError> {
        match self.decoders.get(action.action_type.as_str()) {
            Some(decoder) => decoder(&action),
            None => {
                tracing::trace!(
                    action_type = %action.action_type,
                    "No decoder registered, keeping envelope"
                );
                Ok(Box::new(action))
            }
        }
    }
}

fn decode_as<A: TypedAction>(action: &StandardAction) -> Result<Box<dyn Action>, ActionError> {
    let decoded = A::decode(action)?;
    Ok(Box::new(decoded))
}

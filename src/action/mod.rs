//! Actions and the bridge between typed actions and their generic envelope.
//!
//! The store never knows concrete action types. Everything it dispatches is a
//! `dyn Action`, and reducers narrow it back with `is`, `downcast_ref` or
//! `view_as` on `dyn Action`. Any action can be turned
//! into a [`StandardAction`] envelope for logging and replay.

mod error;
mod log;
mod registry;
mod standard;
mod typed;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

pub use error::ActionError;
pub use log::ActionLog;
pub use registry::ActionRegistry;
pub use standard::StandardAction;
pub use typed::{Init, TypedAction};

/// Structured action payload.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Anything that can be dispatched to a store.
///
/// Implemented automatically for every [`TypedAction`] and for
/// [`StandardAction`].
pub trait Action: Any + Send + Sync + fmt::Debug {
    /// Stable type tag.
    fn action_type(&self) -> &str;

    /// Generic, serializable form of this action.
    fn to_standard_action(&self) -> StandardAction;

    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn Action + 'a {
    /// Whether this action is a concrete `A`.
    pub fn is<A: Action>(&self) -> bool {
        self.as_any().is::<A>()
    }

    pub fn downcast_ref<A: Action>(&self) -> Option<&A> {
        self.as_any().downcast_ref::<A>()
    }

    /// Whether a reducer expecting `A` can handle this action: either it is
    /// an `A`, or an envelope carrying `A`'s type tag.
    pub fn accepts<A: TypedAction>(&self) -> bool {
        self.is::<A>()
            || self
                .downcast_ref::<StandardAction>()
                .is_some_and(|standard| standard.action_type == A::TYPE)
    }

    /// View this action as an `A`.
    ///
    /// Borrows when the action already is an `A`. Envelopes with a matching
    /// type tag are decoded. Returns `None` for anything else, including
    /// envelopes whose payload does not fit `A`.
    pub fn view_as<A: TypedAction>(&self) -> Option<Cow<'_, A>> {
        if let Some(action) = self.downcast_ref::<A>() {
            return Some(Cow::Borrowed(action));
        }
        let standard = self.downcast_ref::<StandardAction>()?;
        A::decode(standard).ok().map(Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rename {
        name: String,
    }

    impl TypedAction for Rename {
        const TYPE: &'static str = "Rename";
    }

    #[test]
    fn typed_action_is_itself() {
        let action: Box<dyn Action> = Box::new(Rename { name: "a".into() });
        assert!(action.is::<Rename>());
        assert!(!action.is::<StandardAction>());
        assert_eq!(action.action_type(), "Rename");
    }

    #[test]
    fn envelope_with_matching_type_is_accepted() {
        let envelope = Rename { name: "b".into() }.encode();
        let action: &dyn Action = &envelope;
        assert!(action.accepts::<Rename>());
        assert!(!action.accepts::<Init>());
    }

    #[test]
    fn view_as_borrows_concrete_actions() {
        let action: Box<dyn Action> = Box::new(Rename { name: "c".into() });
        assert!(matches!(action.view_as::<Rename>(), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn view_as_decodes_envelopes() {
        let envelope = Rename { name: "d".into() }.encode();
        let action: &dyn Action = &envelope;
        let viewed = action.view_as::<Rename>().expect("envelope should decode");
        assert_eq!(viewed.name, "d");
    }

    #[test]
    fn view_as_rejects_unrelated_envelopes() {
        let envelope = StandardAction::new("Other");
        let action: &dyn Action = &envelope;
        assert!(action.view_as::<Rename>().is_none());
    }
}

//! Counter application used by `anyflux replay`.

use anyflux::reducer::{filtered, CombinedReducer};
use anyflux::{Action, ActionRegistry, TypedAction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CounterState {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Increment;

impl TypedAction for Increment {
    const TYPE: &'static str = "Increment";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decrement;

impl TypedAction for Decrement {
    const TYPE: &'static str = "Decrement";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetValue(pub i64);

impl TypedAction for SetValue {
    const TYPE: &'static str = "SetValue";
}

pub fn registry() -> ActionRegistry {
    ActionRegistry::new()
        .with::<Increment>()
        .with::<Decrement>()
        .with::<SetValue>()
}

pub fn reducer() -> CombinedReducer<CounterState> {
    CombinedReducer::new(|_: &dyn Action, state: Option<CounterState>| state.unwrap_or_default())
        .and(filtered::<Increment, _, _>(
            |_: &dyn Action, state: Option<CounterState>| {
                let state = state.unwrap_or_default();
                CounterState {
                    count: state.count.saturating_add(1),
                }
            },
        ))
        .and(filtered::<Decrement, _, _>(
            |_: &dyn Action, state: Option<CounterState>| {
                let state = state.unwrap_or_default();
                CounterState {
                    count: state.count.saturating_sub(1),
                }
            },
        ))
        .and(filtered::<SetValue, _, _>(
            |action: &dyn Action, state: Option<CounterState>| match action.view_as::<SetValue>() {
                Some(set) => CounterState { count: set.0 },
                None => state.unwrap_or_default(),
            },
        ))
}

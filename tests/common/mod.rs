//! Shared test state, actions and subscribers.

#![allow(dead_code, unused_imports)]

use anyflux::{Action, Reducer, StoreSubscriber, TypedAction};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State with an optional counter, so tests can tell "never reduced" apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestState {
    pub value: Option<i64>,
}

/// State with a string field, for projection tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestStringState {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValue(pub i64);

impl TypedAction for SetValue {
    const TYPE: &'static str = "SetValue";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetString(pub String);

impl TypedAction for SetString {
    const TYPE: &'static str = "SetString";
}

/// Reducer for [`TestState`]: `SetValue` (typed or envelope) replaces the
/// value, anything else leaves it alone.
pub fn test_reducer() -> impl Reducer<TestState> {
    |action: &dyn Action, state: Option<TestState>| {
        let mut state = state.unwrap_or_default();
        if let Some(set) = action.view_as::<SetValue>() {
            state.value = Some(set.0);
        }
        state
    }
}

pub fn string_reducer() -> impl Reducer<TestStringState> {
    |action: &dyn Action, state: Option<TestStringState>| {
        let mut state = state.unwrap_or_default();
        if let Some(set) = action.view_as::<SetString>() {
            state.value = set.0.clone();
        }
        state
    }
}

/// Subscriber that keeps every state it is given.
pub struct RecordingSubscriber<T> {
    received: Mutex<Vec<T>>,
}

impl<T> RecordingSubscriber<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.received.lock().len()
    }
}

impl<T: Clone> RecordingSubscriber<T> {
    pub fn received(&self) -> Vec<T> {
        self.received.lock().clone()
    }

    pub fn last(&self) -> Option<T> {
        self.received.lock().last().cloned()
    }
}

impl<T: Send + 'static> StoreSubscriber<T> for RecordingSubscriber<T> {
    fn new_state(&self, state: T) {
        self.received.lock().push(state);
    }
}

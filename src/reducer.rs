//! Reducer trait and helpers for narrowing generic actions.

use std::marker::PhantomData;

use crate::action::{Action, TypedAction};

/// Reducer computes the next state from the current one and an action.
///
/// The store is the only caller. It passes `None` as the state exactly once,
/// for the [`Init`](crate::Init) action of a store created without an initial
/// state. Reducers must be pure: no side effects, and in particular no
/// dispatching into the store that is calling them.
pub trait Reducer<S>: Send + Sync + 'static {
    fn reduce(&self, action: &dyn Action, state: Option<S>) -> S;
}

impl<S, F> Reducer<S> for F
where
    F: Fn(&dyn Action, Option<S>) -> S + Send + Sync + 'static,
{
    fn reduce(&self, action: &dyn Action, state: Option<S>) -> S {
        self(action, state)
    }
}

/// Run `reducer` only for actions it can handle.
///
/// The reducer is called when `action` is an `A` (or an envelope of one), and
/// always when there is no state yet so a default state can be built.
/// Otherwise the existing state is returned untouched.
pub fn with_specific_types<A, S, F>(action: &dyn Action, state: Option<S>, reducer: F) -> S
where
    A: TypedAction,
    F: FnOnce(&dyn Action, Option<S>) -> S,
{
    match state {
        Some(state) if !action.accepts::<A>() => state,
        state => reducer(action, state),
    }
}

/// Reducer that only sees actions of family `A`.
///
/// See [`with_specific_types`].
pub struct Filtered<A, F> {
    reducer: F,
    _action: PhantomData<fn() -> A>,
}

pub fn filtered<A, S, F>(reducer: F) -> Filtered<A, F>
where
    A: TypedAction,
    F: Fn(&dyn Action, Option<S>) -> S + Send + Sync + 'static,
{
    Filtered {
        reducer,
        _action: PhantomData,
    }
}

impl<A, S, F> Reducer<S> for Filtered<A, F>
where
    A: TypedAction,
    F: Fn(&dyn Action, Option<S>) -> S + Send + Sync + 'static,
{
    fn reduce(&self, action: &dyn Action, state: Option<S>) -> S {
        with_specific_types::<A, S, _>(action, state, &self.reducer)
    }
}

/// Runs several reducers in order, threading the state through each.
pub struct CombinedReducer<S> {
    first: Box<dyn Reducer<S>>,
    rest: Vec<Box<dyn Reducer<S>>>,
}

impl<S: 'static> CombinedReducer<S> {
    pub fn new(first: impl Reducer<S>) -> Self {
        Self {
            first: Box::new(first),
            rest: Vec::new(),
        }
    }

    pub fn and(mut self, next: impl Reducer<S>) -> Self {
        self.rest.push(Box::new(next));
        self
    }
}

impl<S: 'static> Reducer<S> for CombinedReducer<S> {
    fn reduce(&self, action: &dyn Action, state: Option<S>) -> S {
        self.rest
            .iter()
            .fold(self.first.reduce(action, state), |state, reducer| {
                reducer.reduce(action, Some(state))
            })
    }
}

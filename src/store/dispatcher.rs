use std::fmt;
use std::sync::Arc;

use crate::action::Action;

use super::{State, Store};

type Completion<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Callback handed to asynchronous action creators.
///
/// Can be cloned, sent to other threads and called any number of times.
/// Each call runs an action creator against the state at that moment and
/// dispatches what it returns. Holds the store strongly, so the store lives
/// at least as long as any outstanding dispatcher.
pub struct AsyncDispatcher<S> {
    store: Store<S>,
    on_dispatched: Option<Completion<S>>,
}

impl<S> Clone for AsyncDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            on_dispatched: self.on_dispatched.clone(),
        }
    }
}

impl<S> fmt::Debug for AsyncDispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncDispatcher")
            .field("has_callback", &self.on_dispatched.is_some())
            .finish()
    }
}

impl<S: State> AsyncDispatcher<S> {
    pub(super) fn new(store: Store<S>, on_dispatched: Option<Completion<S>>) -> Self {
        Self {
            store,
            on_dispatched,
        }
    }

    /// Run `creator` and dispatch its action. Returns whether an action was
    /// dispatched.
    pub fn dispatch<A, F>(&self, creator: F) -> bool
    where
        A: Action,
        F: FnOnce(&S, &Store<S>) -> Option<A>,
    {
        if self.store.dispatch_creator(creator).is_none() {
            tracing::trace!("Async action creator produced no action");
            return false;
        }
        if let Some(callback) = &self.on_dispatched {
            callback(&self.store.state());
        }
        true
    }
}

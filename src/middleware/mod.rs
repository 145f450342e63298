//! Interceptors wrapped around a store's dispatch function.
//!
//! A middleware receives the store's [`MiddlewareApi`] and the `next`
//! dispatch function, and returns a new dispatch function. The store folds
//! its middleware list into one pipeline at construction time; the first
//! middleware in the list is the outermost layer:
//!
//! ```text
//! dispatch ──→ [A before] ──→ [B before] ──→ reducer + notify
//!                                                  │
//! caller  ←── [A after]  ←── [B after]  ←──────────┘
//! ```
//!
//! A middleware may inspect, replace, delay or drop the action, or dispatch
//! new actions through the api.

mod logging;
mod recorder;

use std::sync::{Arc, Weak};

use crate::action::Action;
use crate::store::{State, StoreInner};

pub use logging::LoggingMiddleware;
pub use recorder::ActionRecorder;

/// A (possibly wrapped) dispatch function. Returns the action it was given,
/// or whatever a middleware substituted for it.
pub type DispatchFn = Arc<dyn Fn(Box<dyn Action>) -> Box<dyn Action> + Send + Sync>;

/// Wrap a closure as a [`DispatchFn`].
pub fn dispatch_fn<F>(f: F) -> DispatchFn
where
    F: Fn(Box<dyn Action>) -> Box<dyn Action> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Layer of the dispatch pipeline.
///
/// Closures `Fn(MiddlewareApi<S>, DispatchFn) -> DispatchFn` implement this
/// trait.
pub trait Middleware<S>: Send + Sync + 'static {
    fn wrap(&self, api: MiddlewareApi<S>, next: DispatchFn) -> DispatchFn;
}

impl<S, F> Middleware<S> for F
where
    F: Fn(MiddlewareApi<S>, DispatchFn) -> DispatchFn + Send + Sync + 'static,
{
    fn wrap(&self, api: MiddlewareApi<S>, next: DispatchFn) -> DispatchFn {
        self(api, next)
    }
}

/// Store accessors handed to middleware.
///
/// Holds the store weakly, so a pipeline never keeps its own store alive.
/// Once the store is gone, `dispatch` hands the action back untouched and
/// `state` returns `None`.
pub struct MiddlewareApi<S> {
    store: Weak<StoreInner<S>>,
}

impl<S> Clone for MiddlewareApi<S> {
    fn clone(&self) -> Self {
        Self {
            store: Weak::clone(&self.store),
        }
    }
}

impl<S: State> MiddlewareApi<S> {
    pub(crate) fn new(store: Weak<StoreInner<S>>) -> Self {
        Self { store }
    }

    /// Dispatch through the full pipeline, starting at the outermost layer.
    #[track_caller]
    pub fn dispatch(&self, action: Box<dyn Action>) -> Box<dyn Action> {
        match self.store.upgrade() {
            Some(store) => store.dispatch(action),
            None => {
                tracing::trace!(
                    action_type = action.action_type(),
                    "Store dropped, discarding dispatch from middleware"
                );
                action
            }
        }
    }

    /// Current state. `None` while the store is still being created, or
    /// after it was dropped.
    pub fn state(&self) -> Option<S> {
        self.store.upgrade()?.current_state()
    }
}

/// Fold `middleware` around `innermost`, first entry outermost.
pub(crate) fn compose<S: State>(
    middleware: &[Box<dyn Middleware<S>>],
    api: &MiddlewareApi<S>,
    innermost: DispatchFn,
) -> DispatchFn {
    middleware
        .iter()
        .rev()
        .fold(innermost, |next, layer| layer.wrap(api.clone(), next))
}

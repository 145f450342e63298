//! The store: single state container, dispatch pipeline and subscribers.
//!
//! # Ordering
//!
//! Within one dispatch the reducer runs, then the state is replaced, then
//! every live subscriber is notified in subscription order, and only then
//! does `dispatch` return. Dispatches are applied in the order they are made.
//!
//! # Re-entrancy
//!
//! Subscribers may dispatch. Reducers may not: dispatching into a store from
//! inside its own reducer is reported through
//! [`diagnostics::fatal_error`](crate::diagnostics::fatal_error) and the
//! nested action is dropped. Dispatches, subscribes and unsubscribes arriving
//! from other threads wait for the running dispatch to finish.

mod dispatcher;
mod state;
mod subscription;

use parking_lot::{ReentrantMutex, RwLock};
use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::action::{Action, ActionError, ActionRegistry, Init, StandardAction, TypedAction};
use crate::diagnostics;
use crate::middleware::{self, DispatchFn, Middleware, MiddlewareApi};
use crate::reducer::Reducer;

pub use dispatcher::AsyncDispatcher;
pub use state::State;
pub use subscription::{CallbackSubscriber, StoreSubscriber};

use subscription::{Observer, Projected, SubscriberKey, SubscriptionRegistry};

/// Handle to a store. Clones share the same store.
pub struct Store<S> {
    inner: Arc<StoreInner<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

pub(crate) struct StoreInner<S> {
    reducer: Box<dyn Reducer<S>>,
    /// `None` only until the first reduction of a store created without state.
    state: RwLock<Option<S>>,
    subscriptions: SubscriptionRegistry<S>,
    /// Built once at construction; holds the store only weakly.
    pipeline: DispatchFn,
    /// Serializes reductions, notifications and subscription changes across
    /// threads. The flag is raised while the reducer runs, so a same-thread
    /// re-entry can be told apart.
    reducing: ReentrantMutex<Cell<bool>>,
}

impl<S: State> Store<S> {
    /// Create a store.
    ///
    /// Without an initial state, [`Init`] is dispatched through the full
    /// pipeline so the reducer can build its default state.
    pub fn new(
        reducer: impl Reducer<S>,
        state: Option<S>,
        middleware: Vec<Box<dyn Middleware<S>>>,
    ) -> Self {
        let seeded = state.is_some();
        let layers = middleware.len();
        let inner = Arc::new_cyclic(|weak: &Weak<StoreInner<S>>| {
            let innermost = {
                let weak = Weak::clone(weak);
                middleware::dispatch_fn(move |action| {
                    if let Some(inner) = weak.upgrade() {
                        inner.reduce_and_notify(&*action);
                    }
                    action
                })
            };
            let api = MiddlewareApi::new(Weak::clone(weak));
            StoreInner {
                reducer: Box::new(reducer),
                state: RwLock::new(state),
                subscriptions: SubscriptionRegistry::new(),
                pipeline: middleware::compose(&middleware, &api, innermost),
                reducing: ReentrantMutex::new(Cell::new(false)),
            }
        });

        let store = Self { inner };
        if !seeded {
            store.dispatch(Init);
            if store.inner.current_state().is_none() {
                tracing::warn!("Init action never reached the reducer, seeding state directly");
                store.inner.reduce_and_notify(&Init);
            }
        }
        tracing::debug!(middleware = layers, seeded, "Store created");
        store
    }

    /// Create a store with an initial state and no middleware.
    pub fn with_state(reducer: impl Reducer<S>, state: S) -> Self {
        Self::new(reducer, Some(state), Vec::new())
    }

    /// Clone of the current state.
    pub fn state(&self) -> S {
        self.inner
            .current_state()
            .expect("store state is seeded during construction")
    }

    /// Whether a reducer of this store is running on the calling thread.
    pub fn is_dispatching(&self) -> bool {
        self.inner.is_reducing_here()
    }

    /// Dispatch an action through the pipeline.
    ///
    /// Returns the action that came out of the pipeline, normally the one
    /// passed in.
    #[track_caller]
    pub fn dispatch(&self, action: impl Action) -> Box<dyn Action> {
        self.inner.dispatch(Box::new(action))
    }

    /// Dispatch an already boxed action, e.g. one from
    /// [`ActionRegistry::decode`].
    #[track_caller]
    pub fn dispatch_boxed(&self, action: Box<dyn Action>) -> Box<dyn Action> {
        self.inner.dispatch(action)
    }

    /// Run an action creator against the current state and dispatch the
    /// action it produces, if any.
    #[track_caller]
    pub fn dispatch_creator<A, F>(&self, creator: F) -> Option<Box<dyn Action>>
    where
        A: Action,
        F: FnOnce(&S, &Store<S>) -> Option<A>,
    {
        let action = creator(&self.state(), self)?;
        Some(self.inner.dispatch(Box::new(action)))
    }

    /// Start an asynchronous action creator.
    ///
    /// The creator gets an [`AsyncDispatcher`] it can hand to any thread or
    /// task and call any number of times later. The store does not track or
    /// cancel it.
    pub fn dispatch_async<F>(&self, creator: F)
    where
        F: FnOnce(&S, &Store<S>, AsyncDispatcher<S>),
    {
        creator(&self.state(), self, AsyncDispatcher::new(self.clone(), None));
    }

    /// Like [`dispatch_async`](Self::dispatch_async), calling `callback` with
    /// the new state each time the dispatcher produces an action.
    pub fn dispatch_async_with_callback<F, C>(&self, creator: F, callback: C)
    where
        F: FnOnce(&S, &Store<S>, AsyncDispatcher<S>),
        C: Fn(&S) + Send + Sync + 'static,
    {
        let dispatcher = AsyncDispatcher::new(self.clone(), Some(Arc::new(callback)));
        creator(&self.state(), self, dispatcher);
    }

    /// Subscribe to the full state.
    ///
    /// The subscriber immediately receives the current state. Subscribing
    /// a subscriber that is already subscribed does nothing. The store only
    /// holds the subscriber weakly; dropping the last `Arc` ends the
    /// subscription.
    pub fn subscribe<O>(&self, subscriber: &Arc<O>)
    where
        O: StoreSubscriber<S> + ?Sized,
    {
        self.subscribe_with(subscriber, S::clone);
    }

    /// Subscribe to a projection of the state.
    ///
    /// Uniqueness is by subscriber only: if `subscriber` is already
    /// subscribed, with any selector, this does nothing and the first
    /// selector stays in effect.
    pub fn subscribe_with<T, O, F>(&self, subscriber: &Arc<O>, selector: F)
    where
        T: 'static,
        O: StoreSubscriber<T> + ?Sized,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let key = SubscriberKey::of(subscriber);
        let observer: Arc<dyn Observer<S>> =
            Arc::new(Projected::<T, O, F>::new(subscriber, selector));

        // Held through the initial delivery so a dispatch on another thread
        // cannot notify this subscriber before it has seen the current state.
        let _dispatch = self.inner.reducing.lock();
        match self.inner.subscriptions.insert(key, observer) {
            Some(observer) => {
                tracing::debug!(
                    subscriptions = self.inner.subscriptions.len(),
                    "Subscriber added"
                );
                if let Some(state) = self.inner.current_state() {
                    observer.deliver(&state);
                }
            }
            None => tracing::debug!("Subscriber already subscribed, ignoring"),
        }
    }

    /// Remove a subscription. Once this returns, the subscriber receives no
    /// further state, even from a dispatch running on another thread.
    pub fn unsubscribe<O: ?Sized>(&self, subscriber: &Arc<O>) {
        let _dispatch = self.inner.reducing.lock();
        if self.inner.subscriptions.remove(SubscriberKey::of(subscriber)) {
            tracing::debug!(
                subscriptions = self.inner.subscriptions.len(),
                "Subscriber removed"
            );
        }
    }

    /// Subscriptions currently held, including ones whose subscriber was
    /// released since the last notification.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.len()
    }

    /// Subscriptions whose subscriber is still alive.
    pub fn live_subscription_count(&self) -> usize {
        self.inner.subscriptions.live_len()
    }

    /// Dispatch recorded envelopes in order, decoding known types through
    /// `registry`. [`Init`] entries are skipped, since every store has
    /// already been through its own.
    ///
    /// Stops at the first envelope that fails to decode; actions before it
    /// stay applied. Returns the number of actions dispatched.
    pub fn replay<I>(&self, actions: I, registry: &ActionRegistry) -> Result<usize, ActionError>
    where
        I: IntoIterator<Item = StandardAction>,
    {
        let mut replayed = 0;
        for envelope in actions {
            if envelope.action_type == Init::TYPE {
                continue;
            }
            let action = registry.decode(envelope)?;
            self.inner.dispatch(action);
            replayed += 1;
        }
        tracing::debug!(replayed, "Replayed actions");
        Ok(replayed)
    }
}

impl<S: State + fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.current_state())
            .field("subscriptions", &self.inner.subscriptions.len())
            .finish()
    }
}

impl<S: State> StoreInner<S> {
    pub(crate) fn current_state(&self) -> Option<S> {
        self.state.read().clone()
    }

    fn is_reducing_here(&self) -> bool {
        // Another thread holding the lock is dispatching, not re-entering.
        self.reducing.try_lock().is_some_and(|flag| flag.get())
    }

    /// Entry point of the pipeline.
    #[track_caller]
    pub(crate) fn dispatch(&self, action: Box<dyn Action>) -> Box<dyn Action> {
        if self.is_reducing_here() {
            diagnostics::fatal_error(format!(
                "Reducers may not dispatch actions (dispatched '{}' while reducing)",
                action.action_type()
            ));
            return action;
        }
        tracing::trace!(action_type = action.action_type(), "Dispatching");
        (self.pipeline)(action)
    }

    /// Innermost layer: run the reducer, swap in the result, notify.
    fn reduce_and_notify(&self, action: &dyn Action) {
        let flag = self.reducing.lock();
        let next = {
            flag.set(true);
            scopeguard::defer! {
                flag.set(false);
            }
            self.reducer.reduce(action, self.current_state())
        };
        *self.state.write() = Some(next);
        self.notify();
    }

    fn notify(&self) {
        let observers = self.subscriptions.live();
        tracing::trace!(subscribers = observers.len(), "Notifying subscribers");
        for observer in observers {
            if let Some(state) = self.current_state() {
                observer.deliver(&state);
            }
        }
    }
}

//! Subscribers and the registry that tracks them.

use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

/// Receives state (or a projection of it) whenever the store changes.
pub trait StoreSubscriber<T>: Send + Sync + 'static {
    fn new_state(&self, state: T);
}

/// Subscriber backed by a closure.
pub struct CallbackSubscriber<T> {
    callback: Box<dyn Fn(T) + Send + Sync>,
}

impl<T> CallbackSubscriber<T> {
    pub fn new(callback: impl Fn(T) + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            callback: Box::new(callback),
        })
    }
}

impl<T: 'static> StoreSubscriber<T> for CallbackSubscriber<T> {
    fn new_state(&self, state: T) {
        (self.callback)(state)
    }
}

/// Identity of a subscriber: the address of its `Arc` allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SubscriberKey(usize);

impl SubscriberKey {
    pub(crate) fn of<O: ?Sized>(subscriber: &Arc<O>) -> Self {
        Self(Arc::as_ptr(subscriber).cast::<()>() as usize)
    }
}

/// Type-erased registry entry.
pub(crate) trait Observer<S>: Send + Sync {
    fn is_alive(&self) -> bool;
    fn deliver(&self, state: &S);
}

/// Weakly held subscriber plus the selector projecting the state it sees.
pub(crate) struct Projected<T, O: ?Sized, F> {
    subscriber: Weak<O>,
    selector: F,
    _substate: PhantomData<fn() -> T>,
}

impl<T, O: ?Sized, F> Projected<T, O, F> {
    pub(crate) fn new(subscriber: &Arc<O>, selector: F) -> Self {
        Self {
            subscriber: Arc::downgrade(subscriber),
            selector,
            _substate: PhantomData,
        }
    }
}

impl<S, T, O, F> Observer<S> for Projected<T, O, F>
where
    O: StoreSubscriber<T> + ?Sized,
    F: Fn(&S) -> T + Send + Sync,
{
    fn is_alive(&self) -> bool {
        self.subscriber.strong_count() > 0
    }

    fn deliver(&self, state: &S) {
        if let Some(subscriber) = self.subscriber.upgrade() {
            subscriber.new_state((self.selector)(state));
        }
    }
}

struct Entry<S> {
    key: SubscriberKey,
    observer: Arc<dyn Observer<S>>,
}

/// Ordered set of subscriptions, unique by subscriber identity.
///
/// Released subscribers are pruned lazily whenever the registry is touched.
/// Pruning always happens before identity comparisons, since a released
/// allocation's address can be reused by a new subscriber.
pub(crate) struct SubscriptionRegistry<S> {
    entries: Mutex<Vec<Entry<S>>>,
}

impl<S> SubscriptionRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append an observer unless `key` is already registered. Returns the
    /// stored observer when it was added.
    pub(crate) fn insert(
        &self,
        key: SubscriberKey,
        observer: Arc<dyn Observer<S>>,
    ) -> Option<Arc<dyn Observer<S>>> {
        let mut entries = self.entries.lock();
        prune(&mut entries);
        if entries.iter().any(|entry| entry.key == key) {
            return None;
        }
        entries.push(Entry {
            key,
            observer: Arc::clone(&observer),
        });
        Some(observer)
    }

    pub(crate) fn remove(&self, key: SubscriberKey) -> bool {
        let mut entries = self.entries.lock();
        prune(&mut entries);
        match entries.iter().position(|entry| entry.key == key) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Prune released subscribers and return the rest in subscription order.
    pub(crate) fn live(&self) -> Vec<Arc<dyn Observer<S>>> {
        let mut entries = self.entries.lock();
        prune(&mut entries);
        entries
            .iter()
            .map(|entry| Arc::clone(&entry.observer))
            .collect()
    }

    /// Entries currently held, including released ones not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub(crate) fn live_len(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.observer.is_alive())
            .count()
    }
}

fn prune<S>(entries: &mut Vec<Entry<S>>) {
    let before = entries.len();
    entries.retain(|entry| entry.observer.is_alive());
    let pruned = before - entries.len();
    if pruned > 0 {
        tracing::trace!(pruned, remaining = entries.len(), "Pruned released subscribers");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Mutex<Vec<u32>>);

    impl StoreSubscriber<u32> for Recorder {
        fn new_state(&self, state: u32) {
            self.0.lock().push(state);
        }
    }

    fn observer(subscriber: &Arc<Recorder>) -> Arc<dyn Observer<u32>> {
        Arc::new(Projected::<u32, _, _>::new(subscriber, |state: &u32| *state))
    }

    #[test]
    fn insert_ignores_same_subscriber() {
        let registry = SubscriptionRegistry::new();
        let subscriber = Arc::new(Recorder(Mutex::new(Vec::new())));
        let key = SubscriberKey::of(&subscriber);

        assert!(registry.insert(key, observer(&subscriber)).is_some());
        assert!(registry.insert(key, observer(&subscriber)).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn released_subscribers_are_pruned_lazily() {
        let registry = SubscriptionRegistry::new();
        let subscriber = Arc::new(Recorder(Mutex::new(Vec::new())));
        registry.insert(SubscriberKey::of(&subscriber), observer(&subscriber));

        drop(subscriber);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.live_len(), 0);
        assert!(registry.live().is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn deliver_projects_state() {
        let subscriber = Arc::new(Recorder(Mutex::new(Vec::new())));
        let projected = Projected::<u32, _, _>::new(&subscriber, |state: &(u32, String)| state.0);
        Observer::<(u32, String)>::deliver(&projected, &(4, "ignored".to_string()));
        assert_eq!(*subscriber.0.lock(), vec![4]);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let subscriber = Arc::new(Recorder(Mutex::new(Vec::new())));
        let key = SubscriberKey::of(&subscriber);
        registry.insert(key, observer(&subscriber));

        assert!(registry.remove(key));
        assert!(!registry.remove(key));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn callback_subscriber_forwards_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscriber = CallbackSubscriber::new(move |state: u32| sink.lock().push(state));
        subscriber.new_state(9);
        assert_eq!(*seen.lock(), vec![9]);
    }
}

mod common;

use anyflux::diagnostics::capture_fatal_errors;
use anyflux::{Action, Init, StandardAction, Store, TypedAction};
use common::{test_reducer, RecordingSubscriber, SetValue, TestState};
use parking_lot::Mutex;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

fn store() -> Store<TestState> {
    Store::new(test_reducer(), None, Vec::new())
}

/// Reducer that records the type of every action and the state it was
/// given.
fn logging_reducer(
    log: Arc<Mutex<Vec<(String, Option<TestState>)>>>,
) -> impl Fn(&dyn Action, Option<TestState>) -> TestState + Send + Sync + 'static {
    move |action: &dyn Action, state: Option<TestState>| {
        log.lock().push((action.action_type().to_string(), state.clone()));
        let mut state = state.unwrap_or_default();
        if let Some(set) = action.view_as::<SetValue>() {
            state.value = Some(set.0);
        }
        state
    }
}

/// Test that a store without initial state is seeded by an Init action
/// reduced from no state.
#[test]
fn test_init_is_first_action() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let store = Store::new(logging_reducer(log.clone()), None, Vec::new());

    assert_eq!(*log.lock(), vec![(Init::TYPE.to_string(), None)]);
    assert_eq!(store.state(), TestState::default());
}

/// Test that a store with initial state skips Init and never passes no state.
#[test]
fn test_initial_state_skips_init() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let initial = TestState { value: Some(9) };
    let store = Store::with_state(logging_reducer(log.clone()), initial.clone());

    assert_eq!(store.state(), initial);
    store.dispatch(SetValue(1));

    assert_eq!(*log.lock(), vec![("SetValue".to_string(), Some(initial))]);
}

/// Test that dispatch hands back the dispatched action.
#[test]
fn test_dispatch_returns_action() {
    let store = store();

    let returned = store.dispatch(SetValue(3));

    assert_eq!(returned.downcast_ref::<SetValue>(), Some(&SetValue(3)));
    assert_eq!(store.state().value, Some(3));
}

/// Test that reducers see actions in dispatch order.
#[test]
fn test_state_is_left_fold_of_actions() {
    let store = store();
    for value in [1, 5, -2, 7] {
        store.dispatch(SetValue(value));
    }
    assert_eq!(store.state().value, Some(7));
}

/// Test that an envelope with a typed action's name is reduced like it.
#[test]
fn test_envelope_reaches_typed_reducer() {
    let store = store();
    store.dispatch(SetValue(11).encode());
    assert_eq!(store.state().value, Some(11));

    store.dispatch(StandardAction::new("Unrelated"));
    assert_eq!(store.state().value, Some(11));
}

/// Test that a reducer dispatching into its own store is reported and the
/// nested action is dropped.
#[test]
fn test_reducer_dispatch_is_fatal_error() {
    let slot: Arc<Mutex<Option<Store<TestState>>>> = Arc::new(Mutex::new(None));
    let reducer = {
        let slot = Arc::clone(&slot);
        move |action: &dyn Action, state: Option<TestState>| {
            let mut state = state.unwrap_or_default();
            if let Some(set) = action.view_as::<SetValue>() {
                state.value = Some(set.0);
                let store = slot.lock().clone();
                if let Some(store) = store {
                    store.dispatch(SetValue(set.0 + 100));
                }
            }
            state
        }
    };
    let store = Store::new(reducer, None, Vec::new());
    *slot.lock() = Some(store.clone());

    let (_, errors) = capture_fatal_errors(|| store.dispatch(SetValue(1)));

    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Reducers may not dispatch"));
    assert!(errors[0].location.file().ends_with("store_dispatch.rs"));
    assert_eq!(store.state().value, Some(1));
    assert!(!store.is_dispatching());

    // The store stays usable.
    slot.lock().take();
    store.dispatch(SetValue(2));
    assert_eq!(store.state().value, Some(2));
}

/// Test that without a hook the violation panics.
#[test]
#[should_panic(expected = "Reducers may not dispatch")]
fn test_reducer_dispatch_panics_by_default() {
    let slot: Arc<Mutex<Option<Store<TestState>>>> = Arc::new(Mutex::new(None));
    let reducer = {
        let slot = Arc::clone(&slot);
        move |_: &dyn Action, state: Option<TestState>| {
            let store = slot.lock().clone();
            if let Some(store) = store {
                store.dispatch(StandardAction::new("Nested"));
            }
            state.unwrap_or_default()
        }
    };
    let store = Store::new(reducer, None, Vec::new());
    *slot.lock() = Some(store.clone());

    store.dispatch(StandardAction::new("Outer"));
}

/// Test that a reducer panic does not leave the store marked as reducing.
#[test]
fn test_reducer_panic_resets_dispatch_flag() {
    let reducer = |action: &dyn Action, state: Option<TestState>| {
        if action.action_type() == "Boom" {
            panic!("reducer failed");
        }
        state.unwrap_or_default()
    };
    let store = Store::new(reducer, None, Vec::new());

    let panicked = {
        let store = store.clone();
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            store.dispatch(StandardAction::new("Boom"));
        }))
        .is_err()
    };

    assert!(panicked);
    assert!(!store.is_dispatching());
    store.dispatch(SetValue(4));
    assert_eq!(store.state(), TestState::default());
}

/// Test that an action creator's action is dispatched.
#[test]
fn test_action_creator_dispatches() {
    let store = store();
    store.dispatch(SetValue(2));

    let dispatched = store.dispatch_creator(|state: &TestState, _: &Store<TestState>| {
        Some(SetValue(state.value.unwrap_or(0) * 10))
    });

    assert!(dispatched.is_some());
    assert_eq!(store.state().value, Some(20));
}

/// Test that an action creator behaves like dispatching its result.
#[test]
fn test_action_creator_matches_direct_dispatch() {
    let direct = store();
    let created = store();
    let direct_subscriber = RecordingSubscriber::<TestState>::new();
    let created_subscriber = RecordingSubscriber::<TestState>::new();
    direct.subscribe(&direct_subscriber);
    created.subscribe(&created_subscriber);

    direct.dispatch(SetValue(6));
    created.dispatch_creator(|_: &TestState, _: &Store<TestState>| Some(SetValue(6)));

    assert_eq!(direct.state(), created.state());
    assert_eq!(direct_subscriber.received(), created_subscriber.received());
}

/// Test that an action creator may decline to produce an action.
#[test]
fn test_action_creator_returning_none_dispatches_nothing() {
    let store = store();
    let subscriber = RecordingSubscriber::<TestState>::new();
    store.subscribe(&subscriber);

    let dispatched = store
        .dispatch_creator(|_: &TestState, _: &Store<TestState>| Option::<SetValue>::None);

    assert!(dispatched.is_none());
    assert_eq!(subscriber.count(), 1);
}

/// Test that an async action creator can dispatch from another thread.
#[test]
fn test_async_creator_dispatches_from_thread() {
    let store = store();
    let (done_tx, done_rx) = mpsc::channel();

    store.dispatch_async(|_, _, dispatcher| {
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            let dispatched = dispatcher.dispatch(|state: &TestState, _: &Store<TestState>| {
                Some(SetValue(state.value.unwrap_or(0) + 5))
            });
            done_tx.send(dispatched).unwrap();
        });
    });

    assert!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap());
    assert_eq!(store.state().value, Some(5));
}

/// Test that the completion callback sees the state after each dispatch.
#[test]
fn test_async_callback_runs_after_each_dispatch() {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (done_tx, done_rx) = mpsc::channel();

    let callback = {
        let seen = Arc::clone(&seen);
        move |state: &TestState| seen.lock().push(state.value)
    };
    store.dispatch_async_with_callback(
        |_, _, dispatcher| {
            thread::spawn(move || {
                dispatcher.dispatch(|_: &TestState, _: &Store<TestState>| Some(SetValue(1)));
                dispatcher
                    .dispatch(|_: &TestState, _: &Store<TestState>| Option::<SetValue>::None);
                dispatcher.dispatch(|_: &TestState, _: &Store<TestState>| Some(SetValue(2)));
                done_tx.send(()).unwrap();
            });
        },
        callback,
    );

    done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(*seen.lock(), vec![Some(1), Some(2)]);
}

/// Test that an async creator can hand its dispatcher to a tokio task.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_async_creator_with_tokio_task() {
    let store = store();
    let mut task = None;

    store.dispatch_async(|state, _, dispatcher| {
        let start = state.value.unwrap_or(0);
        task = Some(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            dispatcher.dispatch(move |_: &TestState, _: &Store<TestState>| {
                Some(SetValue(start + 42))
            })
        }));
    });

    let dispatched = task.expect("creator spawned a task").await.unwrap();
    assert!(dispatched);
    assert_eq!(store.state().value, Some(42));
}

/// Test that dispatches from many threads are all applied.
#[test]
fn test_concurrent_dispatches_are_serialized() {
    let reducer = |action: &dyn Action, state: Option<TestState>| {
        let mut state = state.unwrap_or_default();
        if action.action_type() == "Increment" {
            state.value = Some(state.value.unwrap_or(0) + 1);
        }
        state
    };
    let store = Store::new(reducer, None, Vec::new());
    let subscriber = RecordingSubscriber::<TestState>::new();
    store.subscribe(&subscriber);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    store.dispatch(StandardAction::new("Increment"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.state().value, Some(800));
    assert_eq!(subscriber.count(), 801);
}

/// Test that dropping the last handle drops the store and its reducer.
#[test]
fn test_store_is_dropped_with_last_handle() {
    let marker = Arc::new(());
    let reducer = {
        let marker = Arc::clone(&marker);
        move |_: &dyn Action, state: Option<TestState>| {
            let _ = &marker;
            state.unwrap_or_default()
        }
    };
    let store = Store::new(reducer, None, Vec::new());
    let other = store.clone();
    assert_eq!(Arc::strong_count(&marker), 2);

    drop(store);
    assert_eq!(Arc::strong_count(&marker), 2);
    drop(other);
    assert_eq!(Arc::strong_count(&marker), 1);
}

/// Test that a decoded action can be dispatched as a box.
#[test]
fn test_dispatch_boxed_decoded_action() {
    let store = store();
    let registry = anyflux::ActionRegistry::new().with::<SetValue>();
    let decoded = registry.decode(SetValue(12).encode()).unwrap();

    let returned = store.dispatch_boxed(decoded);

    assert!(returned.is::<SetValue>());
    assert_eq!(store.state().value, Some(12));
}

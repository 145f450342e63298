//! Middleware that keeps a log of dispatched actions for later replay.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::action::{Action, ActionLog, StandardAction};
use crate::store::State;

use super::{dispatch_fn, DispatchFn, Middleware, MiddlewareApi};

/// Records the envelope of every action that reaches this layer.
///
/// Clones share the same buffer, so keep one handle outside the store to
/// read what was recorded. With a non-zero capacity only the most recent
/// `capacity` actions are kept.
#[derive(Clone, Default)]
pub struct ActionRecorder {
    entries: Arc<Mutex<VecDeque<StandardAction>>>,
    capacity: usize,
}

impl ActionRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            capacity,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn record(&self, action: &dyn Action) {
        let mut entries = self.entries.lock();
        if self.capacity > 0 && entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(action.to_standard_action());
    }

    pub fn entries(&self) -> Vec<StandardAction> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Snapshot of the recorded actions, oldest first.
    pub fn log(&self) -> ActionLog {
        ActionLog::new(self.entries())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<S: State> Middleware<S> for ActionRecorder {
    fn wrap(&self, _api: MiddlewareApi<S>, next: DispatchFn) -> DispatchFn {
        let recorder = self.clone();
        dispatch_fn(move |action| {
            recorder.record(&*action);
            next(action)
        })
    }
}

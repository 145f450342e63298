//! Reporting of programming-contract violations.
//!
//! The store calls [`fatal_error`] when it is misused in a way it cannot
//! recover from, e.g. a reducer dispatching into its own store. By default
//! that logs and panics. Applications can install their own hook with
//! [`set_fatal_hook`], and tests can collect violations on the current thread
//! with [`capture_fatal_errors`] instead of crashing.

use parking_lot::RwLock;
use std::cell::RefCell;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// A reported contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalError {
    pub message: String,
    /// Where the offending call was made.
    pub location: &'static Location<'static>,
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.location)
    }
}

pub type FatalHook = Arc<dyn Fn(&FatalError) + Send + Sync>;

static HOOK: RwLock<Option<FatalHook>> = parking_lot::const_rwlock(None);

thread_local! {
    static CAPTURED: RefCell<Option<Vec<FatalError>>> = const { RefCell::new(None) };
}

/// Report a contract violation at the caller's location.
///
/// Returns only if the active hook returns; callers must then abandon the
/// operation that triggered the report.
#[track_caller]
pub fn fatal_error(message: impl Into<String>) {
    let error = FatalError {
        message: message.into(),
        location: Location::caller(),
    };

    let captured = CAPTURED.with(|captured| match captured.borrow_mut().as_mut() {
        Some(errors) => {
            errors.push(error.clone());
            true
        }
        None => false,
    });
    if captured {
        tracing::debug!(location = %error.location, "Captured fatal error: {}", error.message);
        return;
    }

    let hook = HOOK.read().clone();
    match hook {
        Some(hook) => hook(&error),
        None => halt(&error),
    }
}

fn halt(error: &FatalError) {
    tracing::error!(location = %error.location, "{}", error.message);
    panic!("{error}");
}

/// Install a process-wide hook, returning the previous one.
pub fn set_fatal_hook(hook: impl Fn(&FatalError) + Send + Sync + 'static) -> Option<FatalHook> {
    HOOK.write().replace(Arc::new(hook))
}

/// Restore the default log-and-panic behavior.
pub fn reset_fatal_hook() -> Option<FatalHook> {
    HOOK.write().take()
}

/// Run `f`, collecting fatal errors reported on this thread instead of
/// passing them to the hook.
///
/// Nested captures each see only their own errors.
pub fn capture_fatal_errors<R>(f: impl FnOnce() -> R) -> (R, Vec<FatalError>) {
    let previous = CAPTURED.with(|captured| captured.borrow_mut().replace(Vec::new()));
    let restore = scopeguard::guard(previous, |previous| {
        CAPTURED.with(|captured| *captured.borrow_mut() = previous);
    });

    let result = f();
    let errors = CAPTURED.with(|captured| captured.borrow_mut().take().unwrap_or_default());
    drop(restore);
    (result, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_collects_errors_without_panicking() {
        let (value, errors) = capture_fatal_errors(|| {
            fatal_error("first");
            fatal_error("second");
            7
        });
        assert_eq!(value, 7);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "first");
        assert!(errors[0].location.file().ends_with("diagnostics.rs"));
    }

    #[test]
    fn nested_capture_keeps_errors_apart() {
        let ((), outer) = capture_fatal_errors(|| {
            fatal_error("outer");
            let ((), inner) = capture_fatal_errors(|| fatal_error("inner"));
            assert_eq!(inner.len(), 1);
            assert_eq!(inner[0].message, "inner");
        });
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].message, "outer");
    }

    #[test]
    fn default_hook_panics() {
        let result = std::panic::catch_unwind(|| fatal_error("boom"));
        assert!(result.is_err());
    }

    #[test]
    fn display_includes_location() {
        let ((), errors) = capture_fatal_errors(|| fatal_error("where"));
        assert!(errors[0].to_string().starts_with("where (at "));
    }
}

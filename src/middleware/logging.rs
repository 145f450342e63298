//! Middleware that traces every dispatched action.

use std::time::Instant;

use crate::action::Action;
use crate::config::{LogLevel, LoggingConfig};
use crate::store::State;

use super::{dispatch_fn, DispatchFn, Middleware, MiddlewareApi};

/// Emits one `tracing` event per action, before it reaches the next layer,
/// and a `trace` event with the elapsed time once the inner layers return.
#[derive(Debug, Clone)]
pub struct LoggingMiddleware {
    level: LogLevel,
    payloads: bool,
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

impl LoggingMiddleware {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            payloads: false,
        }
    }

    /// Also log each action's payload as JSON.
    pub fn with_payloads(mut self, payloads: bool) -> Self {
        self.payloads = payloads;
        self
    }

    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(config.level).with_payloads(config.payloads)
    }
}

impl<S: State> Middleware<S> for LoggingMiddleware {
    fn wrap(&self, _api: MiddlewareApi<S>, next: DispatchFn) -> DispatchFn {
        let level = self.level;
        let payloads = self.payloads;
        dispatch_fn(move |action| {
            log_action(level, &*action, payloads);
            let started = Instant::now();
            let action = next(action);
            tracing::trace!(
                action_type = action.action_type(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "Action dispatched"
            );
            action
        })
    }
}

fn log_action(level: LogLevel, action: &dyn Action, payloads: bool) {
    let payload = if payloads {
        action
            .to_standard_action()
            .payload
            .map(|payload| serde_json::Value::Object(payload).to_string())
    } else {
        None
    };
    let payload = payload.as_deref().unwrap_or("-");
    let action_type = action.action_type();

    macro_rules! emit {
        ($macro:ident) => {
            tracing::$macro!(action_type, payload, "Dispatching action")
        };
    }

    match level {
        LogLevel::Trace => emit!(trace),
        LogLevel::Debug => emit!(debug),
        LogLevel::Info => emit!(info),
        LogLevel::Warn => emit!(warn),
        LogLevel::Error => emit!(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::StandardAction;
    use std::sync::Weak;

    #[test]
    fn passes_action_through_unchanged() {
        let middleware = LoggingMiddleware::new(LogLevel::Info).with_payloads(true);
        let inner = dispatch_fn(|action| action);
        let api = MiddlewareApi::<u32>::new(Weak::new());
        let pipeline = Middleware::<u32>::wrap(&middleware, api, inner);

        let action = pipeline(Box::new(StandardAction::new("Logged")));
        assert_eq!(action.action_type(), "Logged");
    }

    #[test]
    fn from_config_copies_settings() {
        let config = LoggingConfig {
            enabled: true,
            level: LogLevel::Warn,
            payloads: true,
        };
        let middleware = LoggingMiddleware::from_config(&config);
        assert_eq!(middleware.level, LogLevel::Warn);
        assert!(middleware.payloads);
    }
}

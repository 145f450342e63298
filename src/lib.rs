//! Unidirectional state container.
//!
//! ```text
//! dispatch ──→ Middleware ──→ Reducer ──→ State ──→ Subscribers
//!    ↑                                                  │
//!    └──────────────────────────────────────────────────┘
//! ```
//!
//! - **Action**: a named event, optionally carrying a payload
//! - **Reducer**: pure function producing the next state from an action
//! - **Middleware**: interceptor wrapped around dispatch
//! - **Store**: holds the single current state and notifies subscribers

pub mod action;
pub mod config;
pub mod diagnostics;
pub mod middleware;
pub mod reducer;
pub mod store;

pub use action::{Action, ActionError, ActionRegistry, Init, Payload, StandardAction, TypedAction};
pub use middleware::{DispatchFn, Middleware, MiddlewareApi};
pub use reducer::{with_specific_types, Reducer};
pub use store::{AsyncDispatcher, CallbackSubscriber, Store, StoreSubscriber};

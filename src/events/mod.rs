//! # Event System
//!
//! Gateway event listeners with once-only or persistent subscriptions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod kind;

pub use dispatcher::{EmitOutcome, EventDispatcher, EventEntry};
pub use handler::EventListener;
pub use handlers::builtin_listeners;
pub use kind::{EventKind, EventPayload};

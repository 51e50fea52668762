//! Built-in event listeners
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod ready;

use std::sync::Arc;

use super::handler::EventListener;
use crate::core::Config;

/// Create all built-in event listeners
pub fn builtin_listeners(config: &Config) -> Vec<Arc<dyn EventListener>> {
    vec![Arc::new(ready::ReadyListener::new(config.activity.clone()))]
}

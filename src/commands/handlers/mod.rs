//! Built-in command handlers
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

pub mod utility;

use std::sync::Arc;

use super::handler::SlashCommand;

/// Create all built-in command handlers
///
/// This list is the command manifest: adding a command means adding its
/// constructor here.
pub fn builtin_commands() -> Vec<Arc<dyn SlashCommand>> {
    vec![Arc::new(utility::PingCommand), Arc::new(utility::TestCommand)]
}

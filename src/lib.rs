// Core layer - configuration and error taxonomy
pub mod core;

// Handler registry shared by both dispatchers
pub mod registry;

// Slash commands: definitions, registration, authorization, dispatch
pub mod commands;

// Gateway event listeners
pub mod events;

// Session lifecycle and serenity wiring
pub mod session;

pub use crate::core::Config;

pub use commands::{
    CommandDefinition, CommandDispatcher, CommandRegistrar, DispatchOutcome, SlashCommand,
};
pub use events::{EventDispatcher, EventKind, EventListener, EventPayload};
pub use registry::{DiscoveryReport, HandlerRegistry, HandlerSource};
pub use session::{BotSession, SessionHandler};

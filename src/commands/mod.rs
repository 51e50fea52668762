//! # Command System
//!
//! Slash command discovery, remote registration and gated dispatch.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod context;
pub mod definition;
pub mod dispatcher;
pub mod gates;
pub mod handler;
pub mod handlers;
pub mod manifest;
pub mod registration;

pub use context::{CommandInvocation, Interaction, InteractionContext};
pub use definition::{CommandDefinition, OptionDefinition, OptionKind, RegistrationTarget};
pub use dispatcher::{CommandDispatcher, CommandEntry, DispatchOutcome};
pub use gates::authorize;
pub use handler::SlashCommand;
pub use handlers::builtin_commands;
pub use manifest::CommandManifest;
pub use registration::{
    CommandRegistrar, GuildRegistration, RegistrationMode, RegistrationReport, SerenityRegistrar,
};

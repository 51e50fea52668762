//! Slash command handler trait
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Declarative definition plus async body, generic over the interaction type

use anyhow::Result;
use async_trait::async_trait;

use super::context::{CommandInvocation, Interaction};
use super::definition::CommandDefinition;

/// Trait for slash command handlers
///
/// A handler declares its command once through `definition()` and is invoked
/// by the dispatcher only after every gate the definition asks for passed.
/// The body is responsible for the single terminal reply.
///
/// # Example
///
/// ```ignore
/// pub struct PingCommand;
///
/// #[async_trait]
/// impl SlashCommand for PingCommand {
///     fn definition(&self) -> CommandDefinition {
///         CommandDefinition::new("ping", "Check that the bot is alive").global(true)
///     }
///
///     async fn execute(&self, interaction: &CommandInvocation) -> Result<()> {
///         interaction.reply("Pong!", false).await
///     }
/// }
/// ```
#[async_trait]
pub trait SlashCommand<I: Interaction = CommandInvocation>: Send + Sync {
    fn definition(&self) -> CommandDefinition;

    async fn execute(&self, interaction: &I) -> Result<()>;
}

//! Utility command handlers
//!
//! Handles: ping, test
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;
use log::info;

use crate::commands::context::{CommandInvocation, Interaction};
use crate::commands::definition::CommandDefinition;
use crate::commands::handler::SlashCommand;

/// /ping - liveness check, registered globally
pub struct PingCommand;

#[async_trait]
impl SlashCommand for PingCommand {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("ping", "Check that the bot is responding").global(true)
    }

    async fn execute(&self, interaction: &CommandInvocation) -> Result<()> {
        interaction.reply("Pong!", false).await?;
        info!("Ping command completed for user {}", interaction.command.user.id);
        Ok(())
    }
}

/// /test - guild-scoped smoke test; guilds come from the command manifest
pub struct TestCommand;

#[async_trait]
impl SlashCommand for TestCommand {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("test", "test command")
    }

    async fn execute(&self, interaction: &CommandInvocation) -> Result<()> {
        interaction.reply("test", false).await
    }
}

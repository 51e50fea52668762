//! Inbound interaction abstraction
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: InteractionContext, Interaction trait, serenity CommandInvocation

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::command::CommandType;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::{GuildId, UserId};
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;

/// Per-interaction facts the authorization pipeline needs
///
/// Permission sets are `None` outside a guild (or when the platform did not
/// resolve them), which fails any gate that requires a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionContext {
    pub user_id: UserId,
    pub guild_id: Option<GuildId>,
    pub command_name: String,
    pub member_permissions: Option<Permissions>,
    pub bot_permissions: Option<Permissions>,
}

/// An inbound interaction as seen by the command dispatcher
#[async_trait]
pub trait Interaction: Send + Sync + 'static {
    /// Whether this is a chat-input command invocation
    fn is_command(&self) -> bool;

    fn context(&self) -> InteractionContext;

    /// Send the initial response to the interaction
    async fn reply(&self, content: &str, ephemeral: bool) -> Result<()>;
}

/// A serenity slash command invocation together with its session handle
///
/// Command bodies reach the gateway/REST session through `ctx` and the raw
/// interaction (options, token) through `command`.
#[derive(Clone)]
pub struct CommandInvocation {
    pub ctx: Context,
    pub command: ApplicationCommandInteraction,
}

impl CommandInvocation {
    pub fn new(ctx: Context, command: ApplicationCommandInteraction) -> Self {
        Self { ctx, command }
    }
}

#[async_trait]
impl Interaction for CommandInvocation {
    fn is_command(&self) -> bool {
        self.command.data.kind == CommandType::ChatInput
    }

    fn context(&self) -> InteractionContext {
        let guild_id = self.command.guild_id;
        InteractionContext {
            user_id: self.command.user.id,
            guild_id,
            command_name: self.command.data.name.clone(),
            member_permissions: self
                .command
                .member
                .as_ref()
                .and_then(|member| member.permissions),
            bot_permissions: guild_id.and(self.command.app_permissions),
        }
    }

    async fn reply(&self, content: &str, ephemeral: bool) -> Result<()> {
        self.command
            .create_interaction_response(&self.ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message.content(content).ephemeral(ephemeral)
                    })
            })
            .await?;
        Ok(())
    }
}

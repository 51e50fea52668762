//! # Bot Session
//!
//! Owns the connection lifecycle: authenticates, builds and reconciles the
//! command and event registries, then attaches the gateway listener.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! Discovery and registration finish before the gateway client exists, so
//! no interaction can arrive for a command the registry does not know yet.

use anyhow::{Context as _, Result};
use log::{error, info, warn};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::Interaction as SerenityInteraction;
use serenity::model::channel::{Message, Reaction};
use serenity::model::event::ResumedEvent;
use serenity::model::gateway::Ready;
use serenity::model::guild::{Guild, Member, UnavailableGuild};
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use crate::commands::{
    builtin_commands, CommandDispatcher, CommandInvocation, CommandManifest, DispatchOutcome,
    RegistrationReport, SerenityRegistrar,
};
use crate::core::Config;
use crate::events::{builtin_listeners, EventDispatcher, EventPayload};

/// Serenity event handler that feeds both dispatchers
///
/// Both dispatchers are read-only here; serenity runs every callback in its
/// own task, so handler bodies execute concurrently.
pub struct SessionHandler {
    commands: Arc<CommandDispatcher>,
    events: Arc<EventDispatcher>,
}

impl SessionHandler {
    pub fn new(commands: Arc<CommandDispatcher>, events: Arc<EventDispatcher>) -> Self {
        Self { commands, events }
    }

    async fn emit(&self, ctx: Context, payload: EventPayload) {
        self.events.emit(ctx, payload).await;
    }
}

#[async_trait]
impl EventHandler for SessionHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.emit(ctx, EventPayload::Ready(Box::new(ready))).await;
    }

    async fn resume(&self, ctx: Context, resumed: ResumedEvent) {
        self.emit(ctx, EventPayload::Resume(resumed)).await;
    }

    async fn cache_ready(&self, ctx: Context, guilds: Vec<GuildId>) {
        info!("📦 Cache ready with {} guilds fully loaded", guilds.len());
        self.emit(ctx, EventPayload::CacheReady(guilds)).await;
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: bool) {
        self.emit(
            ctx,
            EventPayload::GuildCreate {
                guild: Box::new(guild),
                is_new,
            },
        )
        .await;
    }

    async fn guild_delete(&self, ctx: Context, incomplete: UnavailableGuild, full: Option<Guild>) {
        self.emit(
            ctx,
            EventPayload::GuildDelete {
                incomplete,
                full: full.map(Box::new),
            },
        )
        .await;
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        self.emit(ctx, EventPayload::GuildMemberAdd(Box::new(new_member)))
            .await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        self.emit(ctx, EventPayload::MessageCreate(Box::new(msg))).await;
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        self.emit(ctx, EventPayload::ReactionAdd(Box::new(reaction)))
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: SerenityInteraction) {
        if let SerenityInteraction::ApplicationCommand(command) = &interaction {
            let invocation = Arc::new(CommandInvocation::new(ctx.clone(), command.clone()));
            if let DispatchOutcome::Failed(e) = self.commands.handle_interaction(invocation).await
            {
                warn!("Slash command '{}' left unresolved: {e}", e.name);
            }
        }
        self.emit(ctx, EventPayload::InteractionCreate(Box::new(interaction)))
            .await;
    }
}

/// The authenticated session and the registries it owns
pub struct BotSession {
    config: Config,
    http: Arc<Http>,
    commands: Arc<CommandDispatcher>,
    events: Arc<EventDispatcher>,
    registration: RegistrationReport,
}

impl BotSession {
    /// Authenticate, load and register handlers
    ///
    /// Fails if the token is rejected, the manifest is malformed, or the
    /// global/development registration PUT fails.
    pub async fn connect(config: Config) -> Result<Self> {
        let http = Arc::new(Http::new(&config.discord_token));
        let app_info = http.get_current_application_info().await.map_err(|e| {
            error!("Failed to authenticate with Discord: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Authentication failed: {}", e)
        })?;
        http.set_application_id(app_info.id.0);
        info!("Authenticated as application {} ({})", app_info.name, app_info.id);

        let manifest = CommandManifest::load_or_default(&config.commands_config_path)?;

        let mut commands = CommandDispatcher::new(config.owners.clone(), manifest);
        let report = commands.load_commands(&builtin_commands());
        if !report.skipped.is_empty() || !report.duplicates.is_empty() {
            warn!(
                "{} command definitions skipped, {} duplicates rejected",
                report.skipped.len(),
                report.duplicates.len()
            );
        }

        let mut events = EventDispatcher::new();
        events.load_events(&builtin_listeners(&config));

        let registrar = SerenityRegistrar::new(Arc::clone(&http));
        let registration = commands
            .register_commands(&registrar, config.dev_guild_id)
            .await
            .context("command registration failed - the bot would have no usable commands")?;

        events.register_events();

        Ok(Self {
            config,
            http,
            commands: Arc::new(commands),
            events: Arc::new(events),
            registration,
        })
    }

    pub fn registration(&self) -> &RegistrationReport {
        &self.registration
    }

    pub fn commands(&self) -> &Arc<CommandDispatcher> {
        &self.commands
    }

    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Attach the listener and run the gateway until shutdown
    pub async fn run(self) -> Result<()> {
        let intents = GatewayIntents::non_privileged();
        let handler = SessionHandler::new(Arc::clone(&self.commands), Arc::clone(&self.events));

        let mut client = Client::builder(&self.config.discord_token, intents)
            .application_id(self.http.application_id().unwrap_or_default())
            .event_handler(handler)
            .await
            .map_err(|e| {
                error!("Failed to create Discord client: {e}");
                anyhow::anyhow!("Client creation failed: {}", e)
            })?;

        info!("Establishing WebSocket connection to Discord gateway...");
        info!("Gateway intents: {intents:?}");

        client.start().await.map_err(|why| {
            error!("Gateway connection failed: {why:?}");
            anyhow::anyhow!("Failed to establish gateway connection: {}", why)
        })
    }
}

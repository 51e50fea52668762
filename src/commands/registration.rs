//! Remote command registration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Full-replace global/dev PUTs, independent per-guild PUTs with outcome collection

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info, warn};
use serenity::http::Http;
use serenity::model::application::command::Command;
use serenity::model::id::GuildId;
use std::sync::Arc;

use super::definition::CommandDefinition;
use crate::core::error::RegistrationError;

/// The platform's application command API
///
/// Both operations are full replacements: the target scope's command set
/// becomes exactly `commands`.
#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    async fn put_global_commands(&self, commands: &[CommandDefinition]) -> Result<()>;

    async fn put_guild_commands(
        &self,
        guild_id: GuildId,
        commands: &[CommandDefinition],
    ) -> Result<()>;
}

/// Registrar backed by serenity's REST client
///
/// The client must know the application id before any PUT.
#[derive(Clone)]
pub struct SerenityRegistrar {
    http: Arc<Http>,
}

impl SerenityRegistrar {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CommandRegistrar for SerenityRegistrar {
    async fn put_global_commands(&self, commands: &[CommandDefinition]) -> Result<()> {
        Command::set_global_application_commands(&self.http, |builder| {
            for command in commands {
                builder.add_application_command(command.to_builder());
            }
            builder
        })
        .await?;
        Ok(())
    }

    async fn put_guild_commands(
        &self,
        guild_id: GuildId,
        commands: &[CommandDefinition],
    ) -> Result<()> {
        guild_id
            .set_application_commands(&self.http, |builder| {
                for command in commands {
                    builder.add_application_command(command.to_builder());
                }
                builder
            })
            .await?;
        Ok(())
    }
}

/// Which reconciliation branch ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationMode {
    /// Entire registry pushed to one guild
    Development(GuildId),
    /// Global set plus per-guild scoped commands
    Production,
}

/// Outcome of one scoped (command, guild) PUT
#[derive(Debug)]
pub struct GuildRegistration {
    pub command: String,
    pub guild_id: GuildId,
    pub result: Result<(), RegistrationError>,
}

impl GuildRegistration {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// What `register_commands` did
#[derive(Debug)]
pub struct RegistrationReport {
    pub mode: RegistrationMode,
    /// Commands in the full-replace PUT (global scope or development guild)
    pub replaced: usize,
    pub guilds: Vec<GuildRegistration>,
}

impl RegistrationReport {
    pub fn failures(&self) -> impl Iterator<Item = &GuildRegistration> {
        self.guilds.iter().filter(|g| !g.is_ok())
    }
}

/// Reconcile local definitions with the remote API
///
/// With a development guild the whole set replaces that guild's commands and
/// per-command scoping is ignored. Otherwise global commands replace the
/// global set, then every scoped command is PUT alone into each of its guilds.
/// Scoped failures are logged and recorded; they never abort the rest.
pub async fn reconcile(
    registrar: &dyn CommandRegistrar,
    definitions: &[CommandDefinition],
    dev_guild: Option<GuildId>,
) -> Result<RegistrationReport, RegistrationError> {
    if let Some(guild_id) = dev_guild {
        info!(
            "[DEV MODE] Registering {} local commands in guild {guild_id}...",
            definitions.len()
        );
        registrar
            .put_guild_commands(guild_id, definitions)
            .await
            .map_err(|source| RegistrationError::DevelopmentGuild { guild_id, source })?;
        info!("Registered {} commands in development guild {guild_id}", definitions.len());

        return Ok(RegistrationReport {
            mode: RegistrationMode::Development(guild_id),
            replaced: definitions.len(),
            guilds: Vec::new(),
        });
    }

    let (global, scoped): (Vec<&CommandDefinition>, Vec<&CommandDefinition>) =
        definitions.iter().partition(|def| def.is_global);

    let global: Vec<CommandDefinition> = global.into_iter().cloned().collect();
    registrar
        .put_global_commands(&global)
        .await
        .map_err(RegistrationError::Global)?;
    info!("Registered {} global commands", global.len());

    let mut guilds = Vec::new();
    for def in scoped {
        if def.guilds_to_register.is_empty() {
            warn!(
                "Command '{}' is not global and lists no guilds - it will not be registered",
                def.name
            );
            continue;
        }

        let body = std::slice::from_ref(def);
        for &guild_id in &def.guilds_to_register {
            let result = registrar
                .put_guild_commands(guild_id, body)
                .await
                .map_err(|source| RegistrationError::Guild {
                    command: def.name.clone(),
                    guild_id,
                    source,
                });

            if let Err(e) = &result {
                error!("Failed to register command {} in guild {guild_id}: {e}", def.name);
            }

            guilds.push(GuildRegistration {
                command: def.name.clone(),
                guild_id,
                result,
            });
        }
    }

    let failed = guilds.iter().filter(|g| !g.is_ok()).count();
    info!(
        "Scoped registration finished: {} succeeded, {failed} failed",
        guilds.len() - failed
    );

    Ok(RegistrationReport {
        mode: RegistrationMode::Production,
        replaced: global.len(),
        guilds,
    })
}

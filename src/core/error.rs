//! Error taxonomy for discovery, registration, and dispatch
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! Load-time errors are recovered locally and aggregated into a
//! [`DiscoveryReport`](crate::registry::DiscoveryReport). Registration errors
//! for the global or development scope block startup; per-guild ones do not.
//! [`AuthorizationDenied`] is a normal outcome, not a failure.

use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;
use thiserror::Error;

/// Configuration problems detected before the session starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN (or BOT_TOKEN) is not set")]
    MissingToken,

    #[error("DEV_MODE is enabled but DEV_MODE_GUILD is not set")]
    MissingDevGuild,

    #[error("{var} is not a valid guild id: {value:?}")]
    InvalidGuildId { var: &'static str, value: String },

    #[error("OWNERS contains an invalid user id: {0:?}")]
    InvalidOwner(String),

    #[error("{var} must be a boolean (true/false/1/0/yes/no/on/off), got {value:?}")]
    InvalidFlag { var: &'static str, value: String },
}

/// A handler definition that cannot be loaded
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("command {name:?}: description must be 1-100 characters")]
    InvalidDescription { name: String },

    #[error("command {command:?}: invalid option {option:?}: {reason}")]
    InvalidOption {
        command: String,
        option: String,
        reason: &'static str,
    },

    #[error("command {name:?}: too many options ({count}, max 25)")]
    TooManyOptions { name: String, count: usize },
}

/// Two definitions claimed the same key; the later one was rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("duplicate {kind} name {name:?}: later definition rejected")]
pub struct DuplicateNameError {
    pub kind: &'static str,
    pub name: String,
}

/// The remote API rejected a registration PUT
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to register global commands: {0}")]
    Global(#[source] anyhow::Error),

    #[error("failed to register commands in development guild {guild_id}: {source}")]
    DevelopmentGuild {
        guild_id: GuildId,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to register command {command:?} in guild {guild_id}: {source}")]
    Guild {
        command: String,
        guild_id: GuildId,
        #[source]
        source: anyhow::Error,
    },
}

/// A gate refused the interaction
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationDenied {
    #[error("invoking user is not an owner")]
    NotOwner,

    #[error("bot is missing permissions {0:?}")]
    BotMissingPermissions(Permissions),

    #[error("user is missing permissions {0:?}")]
    UserMissingPermissions(Permissions),
}

impl AuthorizationDenied {
    /// Text of the ephemeral reply sent to the invoking user
    pub fn reply_content(&self) -> &'static str {
        match self {
            AuthorizationDenied::NotOwner => "Only owners can use this command.",
            AuthorizationDenied::BotMissingPermissions(_) => {
                "I don't have enough permissions to execute this command."
            }
            AuthorizationDenied::UserMissingPermissions(_) => {
                "You don't have enough permissions to execute this command."
            }
        }
    }
}

/// A command or event handler body failed or panicked
#[derive(Debug, Error)]
#[error("handler {name:?} failed: {message}")]
pub struct HandlerExecutionError {
    pub name: String,
    pub message: String,
}

impl HandlerExecutionError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Human-readable reason a spawned handler task ended abnormally
pub(crate) fn panic_message(join_error: tokio::task::JoinError) -> String {
    if !join_error.is_panic() {
        return format!("task aborted: {join_error}");
    }
    let payload = join_error.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

//! Environment configuration
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Token, development mode, owners, log level, manifest path, activity

use serenity::model::id::{GuildId, UserId};

use super::error::ConfigError;

/// Default location of the optional command scope manifest
pub const DEFAULT_COMMANDS_CONFIG_PATH: &str = "commands.yaml";

/// Runtime configuration read from the environment (and `.env` via dotenvy)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub discord_token: String,
    /// Present iff development mode is active
    pub dev_guild_id: Option<GuildId>,
    pub owners: Vec<UserId>,
    pub log_level: String,
    pub commands_config_path: String,
    pub activity: Option<String>,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = get("DISCORD_TOKEN")
            .or_else(|| get("BOT_TOKEN"))
            .ok_or(ConfigError::MissingToken)?;

        let dev_mode = match get("DEV_MODE") {
            Some(value) => parse_flag("DEV_MODE", &value)?,
            None => false,
        };

        let dev_guild_id = if dev_mode {
            let raw = get("DEV_MODE_GUILD").ok_or(ConfigError::MissingDevGuild)?;
            let id = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidGuildId {
                    var: "DEV_MODE_GUILD",
                    value: raw.clone(),
                })?;
            Some(GuildId(id))
        } else {
            None
        };

        let owners = match get("OWNERS") {
            Some(raw) => parse_owners(&raw)?,
            None => Vec::new(),
        };

        Ok(Config {
            discord_token,
            dev_guild_id,
            owners,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            commands_config_path: get("COMMANDS_CONFIG_PATH")
                .unwrap_or_else(|| DEFAULT_COMMANDS_CONFIG_PATH.to_string()),
            activity: get("BOT_ACTIVITY"),
        })
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_guild_id.is_some()
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

/// Parse the `;`-separated owner list
fn parse_owners(raw: &str) -> Result<Vec<UserId>, ConfigError> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map(UserId)
                .map_err(|_| ConfigError::InvalidOwner(s.to_string()))
        })
        .collect()
}

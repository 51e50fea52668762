//! Declarative slash command definitions
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Name/description/option schema, scoping and authorization flags

use std::sync::OnceLock;

use regex::Regex;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::id::GuildId;
use serenity::model::permissions::Permissions;

use crate::core::error::DiscoveryError;

/// Discord limit on command and option names
pub const NAME_MAX_LEN: usize = 32;
/// Discord limit on command and option descriptions
pub const DESCRIPTION_MAX_LEN: usize = 100;
/// Discord limit on options per command
pub const MAX_OPTIONS: usize = 25;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[-_\p{Ll}\p{N}]{1,32}$").expect("name pattern is a valid regex")
    })
}

/// Where a registration PUT is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationTarget {
    Global,
    Guild(GuildId),
}

/// Value type of a command option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Number,
}

impl From<OptionKind> for CommandOptionType {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::String => CommandOptionType::String,
            OptionKind::Integer => CommandOptionType::Integer,
            OptionKind::Boolean => CommandOptionType::Boolean,
            OptionKind::User => CommandOptionType::User,
            OptionKind::Channel => CommandOptionType::Channel,
            OptionKind::Role => CommandOptionType::Role,
            OptionKind::Number => CommandOptionType::Number,
        }
    }
}

/// One parameter of a slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDefinition {
    pub name: String,
    pub description: String,
    pub kind: OptionKind,
    pub required: bool,
}

impl OptionDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Everything the dispatcher needs to know about a command besides its body
///
/// Created once at discovery and immutable afterwards.
///
/// ```ignore
/// CommandDefinition::new("ban", "Ban a member")
///     .option(OptionDefinition::new("user", "Who to ban", OptionKind::User).required(true))
///     .guilds([GuildId(1234)])
///     .required_user_permissions(Permissions::BAN_MEMBERS)
///     .required_bot_permissions(Permissions::BAN_MEMBERS);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub options: Vec<OptionDefinition>,
    pub is_global: bool,
    /// Only meaningful when `is_global` is false
    pub guilds_to_register: Vec<GuildId>,
    pub owner_only: bool,
    pub required_user_permissions: Permissions,
    pub required_bot_permissions: Permissions,
}

impl CommandDefinition {
    /// A guild-scoped command with no guilds, no options and no gates
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
            is_global: false,
            guilds_to_register: Vec::new(),
            owner_only: false,
            required_user_permissions: Permissions::empty(),
            required_bot_permissions: Permissions::empty(),
        }
    }

    pub fn option(mut self, option: OptionDefinition) -> Self {
        self.options.push(option);
        self
    }

    pub fn global(mut self, is_global: bool) -> Self {
        self.is_global = is_global;
        self
    }

    pub fn guilds(mut self, guilds: impl IntoIterator<Item = GuildId>) -> Self {
        self.guilds_to_register = guilds.into_iter().collect();
        self
    }

    pub fn owner_only(mut self, owner_only: bool) -> Self {
        self.owner_only = owner_only;
        self
    }

    pub fn required_user_permissions(mut self, permissions: Permissions) -> Self {
        self.required_user_permissions = permissions;
        self
    }

    pub fn required_bot_permissions(mut self, permissions: Permissions) -> Self {
        self.required_bot_permissions = permissions;
        self
    }

    /// Registration targets outside development mode
    pub fn targets(&self) -> Vec<RegistrationTarget> {
        if self.is_global {
            vec![RegistrationTarget::Global]
        } else {
            self.guilds_to_register
                .iter()
                .copied()
                .map(RegistrationTarget::Guild)
                .collect()
        }
    }

    /// Check platform constraints on names, descriptions and options
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        check_name(&self.name).map_err(|reason| DiscoveryError::InvalidName {
            name: self.name.clone(),
            reason,
        })?;

        if self.description.is_empty() || self.description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(DiscoveryError::InvalidDescription {
                name: self.name.clone(),
            });
        }

        if self.options.len() > MAX_OPTIONS {
            return Err(DiscoveryError::TooManyOptions {
                name: self.name.clone(),
                count: self.options.len(),
            });
        }

        let mut seen_optional = false;
        for opt in &self.options {
            let invalid = |reason| DiscoveryError::InvalidOption {
                command: self.name.clone(),
                option: opt.name.clone(),
                reason,
            };

            check_name(&opt.name).map_err(invalid)?;
            if opt.description.is_empty() || opt.description.chars().count() > DESCRIPTION_MAX_LEN
            {
                return Err(invalid("description must be 1-100 characters"));
            }
            if opt.required && seen_optional {
                return Err(invalid("required options must precede optional ones"));
            }
            seen_optional |= !opt.required;
        }

        Ok(())
    }

    /// Serenity builder used as the PUT body
    pub fn to_builder(&self) -> CreateApplicationCommand {
        let mut command = CreateApplicationCommand::default();
        command.name(&self.name).description(&self.description);
        for opt in &self.options {
            command.create_option(|o| {
                o.name(&opt.name)
                    .description(&opt.description)
                    .kind(opt.kind.into())
                    .required(opt.required)
            });
        }
        command
    }
}

fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is missing");
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err("longer than 32 characters");
    }
    if !name_pattern().is_match(name) {
        return Err("only lowercase letters, digits, '-' and '_' are allowed");
    }
    Ok(())
}

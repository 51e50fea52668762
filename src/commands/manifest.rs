//! # Command Scope Manifest
//!
//! Optional YAML file that lets operators move commands between global and
//! guild scope without rebuilding:
//!
//! ```yaml
//! commands:
//!   test:
//!     global: false
//!     guilds: [123456789012345678, 876543210987654321]
//!   ping:
//!     global: true
//! ```
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{Context as _, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serenity::model::id::GuildId;
use std::collections::HashMap;
use std::path::Path;

use super::definition::CommandDefinition;

/// Root of the manifest file
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommandManifest {
    #[serde(default)]
    pub commands: HashMap<String, ScopeOverride>,
}

/// Scoping overrides for a single command
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScopeOverride {
    #[serde(default)]
    pub global: Option<bool>,
    #[serde(default)]
    pub guilds: Option<Vec<u64>>,
}

impl CommandManifest {
    /// Load the manifest, treating a missing file as "no overrides"
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "No command manifest at {} - using built-in scopes",
                path.display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load the manifest from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest = Self::from_yaml(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!(
            "Loaded command manifest from {} ({} overrides)",
            path.display(),
            manifest.commands.len()
        );
        Ok(manifest)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply the override for this command, if any
    pub fn apply(&self, mut definition: CommandDefinition) -> CommandDefinition {
        if let Some(scope) = self.commands.get(&definition.name) {
            if let Some(global) = scope.global {
                definition.is_global = global;
            }
            if let Some(guilds) = &scope.guilds {
                definition.guilds_to_register = guilds.iter().copied().map(GuildId).collect();
            }
        }
        definition
    }

    /// Warn about overrides naming commands that were never loaded
    pub fn warn_unmatched<'a>(&self, loaded: impl IntoIterator<Item = &'a String>) {
        let loaded: Vec<&String> = loaded.into_iter().collect();
        for name in self.commands.keys() {
            if !loaded.contains(&name) {
                warn!("Command manifest overrides unknown command '{name}'");
            }
        }
    }
}

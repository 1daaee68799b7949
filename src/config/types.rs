//! Configuration types for Relaybot
//!
//! Mirrors the layout of `settings.json`. Every section uses
//! `#[serde(default)]` so a partial settings file only overrides what it
//! names.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default base URL of the platform REST API.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Default per-dispatch timeout in seconds.
pub const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 30;

/// Top-level settings object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scoped test deployment settings.
    pub debug: DebugConfig,
    /// Production deployment settings.
    pub discord: DiscordConfig,
    /// Where descriptor manifests live.
    pub plugins: PluginsConfig,
    /// Command registration policy.
    pub commands: CommandsConfig,
    /// Command dispatch policy.
    pub dispatch: DispatchConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Debug (scoped) mode settings.
///
/// When `enabled` is set, commands are published to a single test guild
/// and debug-level log lines are shown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Whether the bot runs against the test deployment.
    pub enabled: bool,
    /// Application id of the test bot.
    pub bot: String,
    /// Guild id that receives the scoped commands.
    pub guild: String,
}

/// Production (global) mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Application id of the production bot.
    pub bot: String,
    /// Base URL of the REST API.
    pub api_base: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Descriptor manifest locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Root directory the descriptor directories are resolved against.
    pub root: PathBuf,
    /// Directory (relative to `root`) holding command manifests.
    pub commands_dir: String,
    /// Directory (relative to `root`) holding event manifests.
    pub events_dir: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            commands_dir: "commands".to_string(),
            events_dir: "events".to_string(),
        }
    }
}

/// Command registration policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Fail startup when two manifests declare the same command name.
    /// When unset the last loaded manifest wins.
    pub reject_duplicates: bool,
}

/// Command dispatch policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Seconds a command handler may run before it is reported as failed.
    /// `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_DISPATCH_TIMEOUT_SECS,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format for the tracing subscriber.
    pub format: LogFormat,
}

/// Where published commands land on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTarget {
    /// Commands visible in a single guild (debug mode).
    Guild {
        application_id: String,
        guild_id: String,
    },
    /// Commands visible everywhere the application is installed.
    Global { application_id: String },
}

impl PublishTarget {
    /// REST path of the bulk-overwrite endpoint for this target.
    pub fn route(&self) -> String {
        match self {
            PublishTarget::Guild {
                application_id,
                guild_id,
            } => format!(
                "/applications/{}/guilds/{}/commands",
                application_id, guild_id
            ),
            PublishTarget::Global { application_id } => {
                format!("/applications/{}/commands", application_id)
            }
        }
    }

    /// Short label used in log lines.
    pub fn scope(&self) -> &'static str {
        match self {
            PublishTarget::Guild { .. } => "guild",
            PublishTarget::Global { .. } => "global",
        }
    }
}

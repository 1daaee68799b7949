//! Configuration loading for Relaybot
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A JSON settings file (`settings.json` by default)
//! 3. `RELAYBOT_*` environment variables
//!
//! Bot tokens are never read from the settings file. They come from the
//! `DEBUG_TOKEN` and `BOT_TOKEN` environment variables (optionally via a
//! `.env` file loaded by the binary).
//!
//! # Example settings.json
//!
//! ```json
//! {
//!   "debug": { "enabled": true, "bot": "1100000000000000001", "guild": "1100000000000000002" },
//!   "discord": { "bot": "1100000000000000003" },
//!   "plugins": { "root": "." },
//!   "dispatch": { "timeout_secs": 30 }
//! }
//! ```

mod types;

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{BotError, Result};

pub use types::{
    CommandsConfig, Config, DebugConfig, DiscordConfig, DispatchConfig, LogFormat, LoggingConfig,
    PluginsConfig, PublishTarget, DEFAULT_API_BASE, DEFAULT_DISPATCH_TIMEOUT_SECS,
};

/// Environment variable holding the token of the test bot.
pub const DEBUG_TOKEN_ENV: &str = "DEBUG_TOKEN";

/// Environment variable holding the token of the production bot.
pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";

impl Config {
    /// Load settings from a JSON file and apply environment overrides.
    ///
    /// # Errors
    /// - `BotError::Config` if the file does not exist or cannot be read
    /// - `BotError::Json` if the file is not valid settings JSON
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BotError::Config(format!(
                "Settings file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config: Config = serde_json::from_str(&content)?;
        config.apply_env_overrides();
        debug!(path = %path.display(), debug_mode = config.debug.enabled, "Loaded settings");
        Ok(config)
    }

    /// Load settings from `path` if it exists, otherwise start from defaults.
    ///
    /// Logs nothing about a missing file; callers report that once their
    /// subscriber is installed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Config::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `RELAYBOT_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RELAYBOT_DEBUG_ENABLED") {
            self.debug.enabled = parse_bool(&v);
        }
        if let Some(v) = lookup("RELAYBOT_DEBUG_BOT") {
            self.debug.bot = v;
        }
        if let Some(v) = lookup("RELAYBOT_DEBUG_GUILD") {
            self.debug.guild = v;
        }
        if let Some(v) = lookup("RELAYBOT_DISCORD_BOT") {
            self.discord.bot = v;
        }
        if let Some(v) = lookup("RELAYBOT_API_BASE") {
            self.discord.api_base = v;
        }
        if let Some(v) = lookup("RELAYBOT_PLUGIN_ROOT") {
            self.plugins.root = v.into();
        }
        if let Some(v) = lookup("RELAYBOT_DISPATCH_TIMEOUT_SECS") {
            match v.trim().parse() {
                Ok(secs) => self.dispatch.timeout_secs = secs,
                Err(_) => warn!(value = %v, "Ignoring invalid RELAYBOT_DISPATCH_TIMEOUT_SECS"),
            }
        }
    }

    /// Where commands are published in the current mode.
    pub fn publish_target(&self) -> PublishTarget {
        if self.debug.enabled {
            PublishTarget::Guild {
                application_id: self.debug.bot.clone(),
                guild_id: self.debug.guild.clone(),
            }
        } else {
            PublishTarget::Global {
                application_id: self.discord.bot.clone(),
            }
        }
    }

    /// Name of the environment variable holding the token for the current mode.
    pub fn token_env(&self) -> &'static str {
        if self.debug.enabled {
            DEBUG_TOKEN_ENV
        } else {
            BOT_TOKEN_ENV
        }
    }

    /// Bot token for the current mode, read from the process environment.
    pub fn token(&self) -> Result<String> {
        self.token_from(|key| std::env::var(key).ok())
    }

    /// Bot token for the current mode using an arbitrary variable lookup.
    pub fn token_from<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = self.token_env();
        match lookup(key) {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(BotError::Config(format!("{} is not set", key))),
        }
    }

    /// Check that the identifiers needed for publishing are present.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = if self.debug.enabled {
            [("debug.bot", &self.debug.bot), ("debug.guild", &self.debug.guild)]
                .into_iter()
                .filter(|(_, v)| v.trim().is_empty())
                .map(|(k, _)| k)
                .collect()
        } else if self.discord.bot.trim().is_empty() {
            vec!["discord.bot"]
        } else {
            Vec::new()
        };

        if !missing.is_empty() {
            return Err(BotError::Config(format!(
                "Missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.discord.api_base.trim().is_empty() {
            return Err(BotError::Config("discord.api_base is empty".to_string()));
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

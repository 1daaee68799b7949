//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise the level follows `debug.enabled`:
//! `debug` for the test bot, `info` for production.

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};
use crate::error::{BotError, Result};

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(config: &Config) -> &'static str {
    if config.debug.enabled {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let installed = match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
    };

    installed.map_err(|e| BotError::Config(format!("Failed to initialise logging: {}", e)))
}

//! Subcommand implementations for the relaybot binary.

mod list;
mod publish;
mod run;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use relaybot::utils::init_logging;
use relaybot::Config;

pub(crate) use list::cmd_list;
pub(crate) use publish::cmd_publish;
pub(crate) use run::cmd_run;

/// Load settings and install the log subscriber.
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    load_config_with(path, |config| {
        init_logging(config).with_context(|| "Failed to initialise logging")
    })
}

fn load_config_with<F>(path: &Path, install_logging: F) -> Result<Config>
where
    F: FnOnce(&Config) -> Result<()>,
{
    let found = path.exists();
    let config = Config::load_or_default(path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    install_logging(&config)?;

    if !found {
        warn!(path = %path.display(), "Settings file not found, using defaults");
    }
    Ok(config)
}

//! Run command: start the bot and feed it frames from stdin.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;

use relaybot::commands::RestPublisher;
use relaybot::events::EventEmitter;
use relaybot::interaction::RestResponder;
use relaybot::Bot;

use super::load_config;

pub(crate) async fn cmd_run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;
    let token = config
        .token()
        .with_context(|| "A bot token is required to run")?;

    let publisher = Arc::new(RestPublisher::new(&config.discord.api_base, token));
    let responder = Arc::new(RestResponder::new(&config.discord.api_base));
    let emitter = Arc::new(EventEmitter::new());

    let bot = Bot::start(&config, publisher, emitter)?;
    info!("Reading gateway frames from stdin");

    let stats = bot
        .feed(BufReader::new(tokio::io::stdin()), responder)
        .await?;
    info!(
        emitted = stats.emitted,
        skipped = stats.skipped,
        "Input closed, shutting down"
    );
    bot.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

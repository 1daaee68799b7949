//! Publish command: one-shot sync of the command list.

use std::path::Path;

use anyhow::{Context, Result};

use relaybot::bot::load_commands;
use relaybot::commands::{builtin_commands, RestPublisher};

use super::load_config;

pub(crate) async fn cmd_publish(config_path: &Path, dry_run: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let commands = load_commands(&config, &builtin_commands())?;
    let target = config.publish_target();

    if dry_run {
        println!("PUT {}", target.route());
        println!("{}", serde_json::to_string_pretty(commands.metadata())?);
        return Ok(());
    }

    config.validate()?;
    let token = config.token()?;
    let publisher = RestPublisher::new(&config.discord.api_base, token);

    commands
        .publish(&publisher, &target)
        .await
        .with_context(|| format!("Failed to publish {} commands", commands.len()))?;

    println!(
        "Published {} commands ({} scope)",
        commands.len(),
        target.scope()
    );
    Ok(())
}

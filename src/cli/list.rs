//! List command: show what discovery finds without publishing.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use relaybot::bot::load_commands;
use relaybot::descriptors::FileLoader;
use relaybot::commands::builtin_commands;
use relaybot::events::{builtin_events, EventRegistry};

use super::load_config;

pub(crate) fn cmd_list(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let commands = Arc::new(load_commands(&config, &builtin_commands())?);
    let events = EventRegistry::discover(
        &FileLoader::new(&config.plugins.root),
        &config.plugins.events_dir,
        &builtin_events(Arc::clone(&commands)),
    );

    println!("Commands ({}):", commands.len());
    for command in commands.metadata() {
        println!("  /{:<24} {}", command.name, command.description);
    }

    println!();
    println!("Events ({}):", events.len());
    for event in events.descriptors() {
        let mode = if event.once { "once" } else { "on" };
        println!("  {:<25} {}", event.name.as_str(), mode);
    }

    Ok(())
}

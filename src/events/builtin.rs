//! Event handlers shipped with the bot.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::commands::CommandRegistry;
use crate::descriptors::HandlerCatalog;
use crate::error::Result;
use crate::interaction::InteractionRouter;

use super::{EventArg, EventArgs, EventHandler};

/// `ready`: announces which account the bot is logged in as.
pub struct ReadyAnnouncer;

#[async_trait]
impl EventHandler for ReadyAnnouncer {
    async fn handle(&self, args: EventArgs) -> Result<()> {
        let user = args.iter().find_map(|arg| match arg {
            EventArg::User(user) => Some(user),
            _ => None,
        });

        match user {
            Some(user) => info!("Successfully logged in as {}!", user.tag()),
            None => warn!("ready emitted without the bot user"),
        }
        Ok(())
    }
}

/// Catalog of the built-in event handlers.
///
/// `interactionCreate` routes into `commands`.
pub fn builtin_events(commands: Arc<CommandRegistry>) -> HandlerCatalog<dyn EventHandler> {
    HandlerCatalog::<dyn EventHandler>::new()
        .with("ready", Arc::new(ReadyAnnouncer))
        .with("interactionCreate", Arc::new(InteractionRouter::new(commands)))
}

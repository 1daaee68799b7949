//! Command handlers shipped with the bot.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::descriptors::HandlerCatalog;
use crate::error::Result;
use crate::interaction::{Interaction, InteractionReply};

use super::CommandHandler;

/// Reply sent by [`TestCommand`].
pub const TEST_REPLY: &str = "Booyah!";

/// Reply sent by [`UnimplementedCommand`].
pub const UNIMPLEMENTED_REPLY: &str =
    "Error: This command has not been properly implemented yet. :(";

/// `/test`: answers privately so the invoker can tell the bot is alive.
pub struct TestCommand;

#[async_trait]
impl CommandHandler for TestCommand {
    async fn execute(&self, interaction: Arc<Interaction>) -> Result<()> {
        interaction
            .reply(InteractionReply::ephemeral(TEST_REPLY))
            .await
    }
}

/// Bound to commands whose manifest has no handler in the catalog.
pub struct UnimplementedCommand;

#[async_trait]
impl CommandHandler for UnimplementedCommand {
    async fn execute(&self, interaction: Arc<Interaction>) -> Result<()> {
        warn!(
            command = interaction.command_name().unwrap_or_default(),
            "Command has no handler attached"
        );
        interaction
            .reply(InteractionReply::ephemeral(UNIMPLEMENTED_REPLY))
            .await
    }
}

/// Catalog of the built-in command handlers.
pub fn builtin_commands() -> HandlerCatalog<dyn CommandHandler> {
    HandlerCatalog::<dyn CommandHandler>::new().with("test", Arc::new(TestCommand))
}

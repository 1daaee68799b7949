//! Slash commands for Relaybot
//!
//! A command is a [`CommandDescriptor`]: platform metadata published to the
//! remote API plus a [`CommandHandler`] that runs when a user invokes it.
//!
//! - **registry**: `CommandRegistry`, the name→handler table with dispatch
//! - **publish**: `CommandPublisher` and the REST/in-memory implementations
//! - **builtin**: handlers shipped with the bot
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use relaybot::commands::{builtin_commands, CommandRegistry};
//! use relaybot::descriptors::FileLoader;
//!
//! let loader = FileLoader::new(".");
//! let registry = CommandRegistry::discover(&loader, "commands", &builtin_commands(), false).unwrap();
//! println!("Loaded {} commands", registry.len());
//! ```

pub mod builtin;
pub mod publish;
pub mod registry;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::descriptors::{
    CommandMetadata, DescriptorManifest, DescriptorShape, HandlerCatalog, ShapeMismatch,
};
use crate::error::Result;
use crate::interaction::Interaction;

pub use builtin::{builtin_commands, TestCommand, UnimplementedCommand};
pub use publish::{CommandPublisher, MemoryPublisher, RestPublisher};
pub use registry::{CommandRegistry, DispatchOutcome, UNKNOWN_COMMAND_REPLY};

/// Code that runs when a command is invoked.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handle one invocation. Errors are logged by the dispatcher.
    async fn execute(&self, interaction: Arc<Interaction>) -> Result<()>;
}

/// Adapter turning an async closure into a [`CommandHandler`].
pub struct FnCommand<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> CommandHandler for FnCommand<F>
where
    F: Fn(Arc<Interaction>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn execute(&self, interaction: Arc<Interaction>) -> Result<()> {
        (self.f)(interaction).await
    }
}

/// Wrap an async closure as a shareable command handler.
pub fn command_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(Arc<Interaction>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(FnCommand { f })
}

/// A loaded command: what to publish and what to run.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub metadata: CommandMetadata,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new(metadata: CommandMetadata, handler: Arc<dyn CommandHandler>) -> Self {
        Self { metadata, handler }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

impl std::fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Shape admitting command manifests whose handler resolves in `catalog`.
///
/// A manifest without an explicit `handler` falls back to the catalog entry
/// named after the command, then to [`UnimplementedCommand`]. A manifest
/// that names a missing handler is rejected.
pub struct CommandShape<'a> {
    catalog: &'a HandlerCatalog<dyn CommandHandler>,
}

impl<'a> CommandShape<'a> {
    pub fn new(catalog: &'a HandlerCatalog<dyn CommandHandler>) -> Self {
        Self { catalog }
    }
}

impl DescriptorShape for CommandShape<'_> {
    type Output = CommandDescriptor;

    fn kind(&self) -> &'static str {
        "BotCommand"
    }

    fn admit(
        &self,
        manifest: DescriptorManifest,
    ) -> std::result::Result<CommandDescriptor, ShapeMismatch> {
        let command = match manifest {
            DescriptorManifest::Command(command) => command,
            other => {
                return Err(ShapeMismatch::WrongKind {
                    expected: "command",
                    found: other.kind(),
                })
            }
        };

        command.metadata.validate()?;

        let handler: Arc<dyn CommandHandler> = match command.handler {
            Some(name) => self
                .catalog
                .get(&name)
                .ok_or(ShapeMismatch::UnknownHandler(name))?,
            None => match self.catalog.get(&command.metadata.name) {
                Some(handler) => handler,
                None => {
                    debug!(command = %command.metadata.name, "No handler attached, using fallback");
                    Arc::new(UnimplementedCommand)
                }
            },
        };

        Ok(CommandDescriptor::new(command.metadata, handler))
    }
}

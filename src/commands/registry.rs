//! Command registry for Relaybot
//!
//! `CommandRegistry` maps command names to handlers and keeps the ordered
//! metadata list that gets published. It is built once at startup and then
//! shared read-only as an `Arc`; every dispatch runs on its own task so a
//! failing, panicking or stuck handler never affects other commands.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::PublishTarget;
use crate::descriptors::{CommandMetadata, FileLoader, HandlerCatalog};
use crate::error::{BotError, Result};
use crate::interaction::{Interaction, InteractionReply};

use super::publish::CommandPublisher;
use super::{CommandDescriptor, CommandHandler, CommandShape};

/// Reply sent when an interaction names a command the registry does not know.
pub const UNKNOWN_COMMAND_REPLY: &str = "Sorry, there was an internal error.";

/// How a single dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler returned `Ok`.
    Completed,
    /// The handler returned an error.
    Failed(String),
    /// The handler panicked.
    Panicked,
    /// The handler exceeded the dispatch timeout and was aborted.
    TimedOut,
    /// No handler is registered under the invoked name.
    UnknownCommand,
}

/// Name→handler table plus the metadata list published to the platform.
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
    metadata: Vec<CommandMetadata>,
    timeout: Option<Duration>,
}

impl CommandRegistry {
    /// Build a registry from already-constructed descriptors.
    ///
    /// Duplicate names overwrite earlier entries (last one wins) unless
    /// `reject_duplicates` is set, in which case a `BotError::Config` is
    /// returned.
    pub fn from_descriptors(
        descriptors: Vec<CommandDescriptor>,
        reject_duplicates: bool,
    ) -> Result<Self> {
        let mut handlers: HashMap<String, Arc<dyn CommandHandler>> = HashMap::new();
        let mut metadata: Vec<CommandMetadata> = Vec::new();

        for descriptor in descriptors {
            let name = descriptor.metadata.name.clone();

            if let Some(existing) = metadata.iter_mut().find(|m| m.name == name) {
                if reject_duplicates {
                    return Err(BotError::Config(format!(
                        "Command '{}' is declared more than once",
                        name
                    )));
                }
                warn!(command = %name, "Duplicate command name, later descriptor replaces earlier one");
                *existing = descriptor.metadata;
            } else {
                metadata.push(descriptor.metadata);
            }

            handlers.insert(name, descriptor.handler);
        }

        Ok(Self {
            handlers,
            metadata,
            timeout: None,
        })
    }

    /// Discover command manifests in `dir_name` and build a registry.
    pub fn discover(
        loader: &FileLoader,
        dir_name: &str,
        catalog: &HandlerCatalog<dyn CommandHandler>,
        reject_duplicates: bool,
    ) -> Result<Self> {
        let descriptors = loader.load(dir_name, &CommandShape::new(catalog));
        let registry = Self::from_descriptors(descriptors, reject_duplicates)?;
        info!(commands = registry.len(), "Command registry built");
        Ok(registry)
    }

    /// Limit how long a handler may run. `None` disables the limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Handler registered under `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Metadata in publish order, one entry per command name.
    pub fn metadata(&self) -> &[CommandMetadata] {
        &self.metadata
    }

    /// Registered command names in publish order.
    pub fn names(&self) -> Vec<&str> {
        self.metadata.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Replace the remote command list for `target` with this registry's.
    pub async fn publish(
        &self,
        publisher: &dyn CommandPublisher,
        target: &PublishTarget,
    ) -> Result<()> {
        info!(
            commands = self.metadata.len(),
            scope = target.scope(),
            "Updating slash commands with the platform"
        );
        publisher.bulk_overwrite(target, &self.metadata).await
    }

    /// Publish on a background task and log the outcome.
    ///
    /// Startup does not wait for the result; the handle is returned for
    /// callers that do want to observe it.
    pub fn spawn_publish(
        self: &Arc<Self>,
        publisher: Arc<dyn CommandPublisher>,
        target: PublishTarget,
    ) -> JoinHandle<Result<()>> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let result = registry.publish(publisher.as_ref(), &target).await;
            match &result {
                Ok(()) => info!(scope = target.scope(), "Slash commands successfully updated"),
                Err(e) => error!(scope = target.scope(), error = %e, "Failed to update slash commands"),
            }
            result
        })
    }

    /// Run the handler for `interaction` on its own task.
    ///
    /// Never fails: unknown commands get an ephemeral apology, handler
    /// failures are logged. The returned handle resolves to the outcome and
    /// may be dropped.
    pub fn dispatch(self: &Arc<Self>, interaction: Arc<Interaction>) -> JoinHandle<DispatchOutcome> {
        let registry = Arc::clone(self);
        tokio::spawn(async move { registry.run(interaction).await })
    }

    async fn run(&self, interaction: Arc<Interaction>) -> DispatchOutcome {
        let name = interaction.command_name().unwrap_or_default().to_string();
        let user = interaction.user.tag();

        let Some(handler) = self.lookup(&name) else {
            warn!(command = %name, user = %user, "User ran unhandled command");
            if let Err(e) = interaction
                .reply(InteractionReply::ephemeral(UNKNOWN_COMMAND_REPLY))
                .await
            {
                error!(command = %name, user = %user, error = %e, "Failed to reply to unhandled command");
            }
            return DispatchOutcome::UnknownCommand;
        };

        let mut task = tokio::spawn(async move { handler.execute(interaction).await });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    task.abort();
                    let e = BotError::Timeout(limit.as_secs());
                    error!(command = %name, user = %user, error = %e, "Could not execute command");
                    return DispatchOutcome::TimedOut;
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(())) => {
                debug!(command = %name, user = %user, "Command executed");
                DispatchOutcome::Completed
            }
            Ok(Err(e)) => {
                error!(command = %name, user = %user, error = %e, "Could not execute command");
                DispatchOutcome::Failed(e.to_string())
            }
            Err(join_error) => {
                error!(command = %name, user = %user, error = %join_error, "Command handler panicked");
                DispatchOutcome::Panicked
            }
        }
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

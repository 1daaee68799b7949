//! Routes inbound interactions.
//!
//! Command invocations go to the [`CommandRegistry`]; any other interaction
//! that accepts a reply gets an ephemeral apology; the rest are ignored.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::commands::{CommandRegistry, DispatchOutcome};
use crate::error::Result;
use crate::events::{EventArg, EventArgs, EventHandler};

use super::{Interaction, InteractionReply};

/// Reply sent to repliable interactions no handler covers.
pub const UNHANDLED_INTERACTION_REPLY: &str = "Sorry, there was an internal error!";

/// What the router did with an interaction.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Handed to the command registry; the handle resolves when the handler ends.
    Dispatched(JoinHandle<DispatchOutcome>),
    /// Answered with the generic apology.
    Apologised,
    /// Not repliable and not a command.
    Ignored,
}

/// The `interactionCreate` handler.
pub struct InteractionRouter {
    commands: Arc<CommandRegistry>,
}

impl InteractionRouter {
    pub fn new(commands: Arc<CommandRegistry>) -> Self {
        Self { commands }
    }

    /// Route one interaction. Command dispatch is not awaited.
    pub async fn route(&self, interaction: Arc<Interaction>) -> RouteOutcome {
        debug!(
            user = %interaction.user.tag(),
            kind = %interaction.kind,
            "Received interaction"
        );

        if interaction.is_command() {
            return RouteOutcome::Dispatched(self.commands.dispatch(interaction));
        }

        if !interaction.is_repliable() {
            return RouteOutcome::Ignored;
        }

        warn!(
            kind = %interaction.kind,
            user = %interaction.user.tag(),
            "Unhandled interaction"
        );
        if let Err(e) = interaction
            .reply(InteractionReply::ephemeral(UNHANDLED_INTERACTION_REPLY))
            .await
        {
            error!(interaction = %interaction.id, error = %e, "Failed to reply to unhandled interaction");
        }
        RouteOutcome::Apologised
    }
}

#[async_trait]
impl EventHandler for InteractionRouter {
    async fn handle(&self, args: EventArgs) -> Result<()> {
        let interaction = args.iter().find_map(|arg| match arg {
            EventArg::Interaction(interaction) => Some(Arc::clone(interaction)),
            _ => None,
        });

        let Some(interaction) = interaction else {
            warn!("interactionCreate emitted without an interaction");
            return Ok(());
        };

        // Awaiting the dispatch keeps it visible to `EventEmitter::drain`.
        if let RouteOutcome::Dispatched(handle) = self.route(interaction).await {
            if let Err(e) = handle.await {
                error!(error = %e, "Dispatch task was cancelled");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandDescriptor, TestCommand};
    use crate::descriptors::CommandMetadata;
    use crate::interaction::{InteractionData, InteractionKind, MemoryResponder, User};

    fn router() -> InteractionRouter {
        let registry = CommandRegistry::from_descriptors(
            vec![CommandDescriptor::new(
                CommandMetadata::new("test", "Run the test function."),
                Arc::new(TestCommand),
            )],
            false,
        )
        .unwrap();
        InteractionRouter::new(Arc::new(registry))
    }

    fn interaction(kind: InteractionKind, responder: &Arc<MemoryResponder>) -> Arc<Interaction> {
        Arc::new(Interaction::new(
            "9",
            kind,
            Some(InteractionData {
                custom_id: Some("button-1".to_string()),
                ..Default::default()
            }),
            User::new("3", "dave"),
            responder.clone(),
        ))
    }

    #[tokio::test]
    async fn test_command_is_dispatched() {
        let responder = Arc::new(MemoryResponder::new());
        let command = Arc::new(Interaction::command(
            "1",
            "test",
            User::new("3", "dave"),
            responder.clone(),
        ));

        match router().route(command).await {
            RouteOutcome::Dispatched(handle) => {
                assert_eq!(handle.await.unwrap(), DispatchOutcome::Completed)
            }
            other => panic!("expected dispatch, got {:?}", other),
        }
        assert_eq!(responder.replies()[0].reply.content, "Booyah!");
    }

    #[tokio::test]
    async fn test_component_gets_apology() {
        let responder = Arc::new(MemoryResponder::new());
        let outcome = router()
            .route(interaction(InteractionKind::MessageComponent, &responder))
            .await;

        assert!(matches!(outcome, RouteOutcome::Apologised));
        let replies = responder.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(
            replies[0].reply,
            InteractionReply::ephemeral(UNHANDLED_INTERACTION_REPLY)
        );
    }

    #[tokio::test]
    async fn test_autocomplete_is_ignored() {
        let responder = Arc::new(MemoryResponder::new());
        let outcome = router()
            .route(interaction(InteractionKind::Autocomplete, &responder))
            .await;

        assert!(matches!(outcome, RouteOutcome::Ignored));
        assert_eq!(responder.count(), 0);
    }

    #[tokio::test]
    async fn test_event_handler_routes_first_interaction_arg() {
        let responder = Arc::new(MemoryResponder::new());
        let args: EventArgs = vec![EventArg::Interaction(interaction(
            InteractionKind::ModalSubmit,
            &responder,
        ))]
        .into();

        router().handle(args).await.unwrap();
        assert_eq!(responder.count(), 1);
    }

    #[tokio::test]
    async fn test_event_handler_waits_for_dispatched_command() {
        let responder = Arc::new(MemoryResponder::new());
        let command = Arc::new(Interaction::command(
            "1",
            "test",
            User::new("3", "dave"),
            responder.clone(),
        ));
        let args: EventArgs = vec![EventArg::Interaction(command)].into();

        router().handle(args).await.unwrap();
        assert_eq!(responder.replies()[0].reply.content, "Booyah!");
    }

    #[tokio::test]
    async fn test_event_handler_without_interaction_is_noop() {
        let args: EventArgs = vec![EventArg::Json(serde_json::json!({}))].into();
        assert!(router().handle(args).await.is_ok());
    }
}

//! Interactions: the inbound events users trigger by running commands,
//! pressing buttons or submitting modals.
//!
//! - **types**: wire types (`InteractionPayload`, `InteractionKind`, `User`, `InteractionReply`)
//! - **responder**: reply transport (`InteractionResponder`, `RestResponder`, `MemoryResponder`)
//! - **router**: `InteractionRouter`, the `interactionCreate` event handler

pub mod responder;
pub mod router;
pub mod types;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{BotError, Result};

pub use responder::{InteractionResponder, MemoryResponder, RecordedReply, RestResponder};
pub use router::{InteractionRouter, RouteOutcome, UNHANDLED_INTERACTION_REPLY};
pub use types::{InteractionData, InteractionKind, InteractionPayload, InteractionReply, User};

/// An inbound interaction bound to the transport that answers it.
pub struct Interaction {
    pub id: String,
    pub token: String,
    pub kind: InteractionKind,
    pub user: User,
    pub guild_id: Option<String>,
    pub data: Option<InteractionData>,
    responder: Arc<dyn InteractionResponder>,
    replied: AtomicBool,
}

impl Interaction {
    /// Bind a parsed payload to a responder.
    ///
    /// Guild interactions carry the user inside `member`; direct-message
    /// interactions carry it at the top level.
    pub fn from_payload(
        payload: InteractionPayload,
        responder: Arc<dyn InteractionResponder>,
    ) -> Result<Self> {
        let user = payload
            .member
            .map(|m| m.user)
            .or(payload.user)
            .ok_or_else(|| {
                BotError::Dispatch(format!("Interaction {} has no user", payload.id))
            })?;

        Ok(Self {
            id: payload.id,
            token: payload.token,
            kind: payload.kind,
            user,
            guild_id: payload.guild_id,
            data: payload.data,
            responder,
            replied: AtomicBool::new(false),
        })
    }

    /// Build an application-command interaction directly.
    pub fn command(
        id: impl Into<String>,
        name: impl Into<String>,
        user: User,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self::new(
            id,
            InteractionKind::ApplicationCommand,
            Some(InteractionData {
                name: name.into(),
                ..Default::default()
            }),
            user,
            responder,
        )
    }

    /// Build an interaction of any kind directly.
    pub fn new(
        id: impl Into<String>,
        kind: InteractionKind,
        data: Option<InteractionData>,
        user: User,
        responder: Arc<dyn InteractionResponder>,
    ) -> Self {
        Self {
            id: id.into(),
            token: String::new(),
            kind,
            user,
            guild_id: None,
            data,
            responder,
            replied: AtomicBool::new(false),
        }
    }

    /// Whether this is a command invocation the registry can dispatch.
    pub fn is_command(&self) -> bool {
        self.kind == InteractionKind::ApplicationCommand && self.data.is_some()
    }

    /// Name of the invoked command, if any.
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.name.as_str())
    }

    /// Whether this interaction accepts a message reply.
    pub fn is_repliable(&self) -> bool {
        self.kind.is_repliable()
    }

    /// Whether a reply has already been sent.
    pub fn replied(&self) -> bool {
        self.replied.load(Ordering::SeqCst)
    }

    /// Send the initial reply. Only one reply is allowed per interaction.
    pub async fn reply(&self, reply: InteractionReply) -> Result<()> {
        if !self.is_repliable() {
            return Err(BotError::Reply(format!(
                "{} interactions cannot be replied to",
                self.kind
            )));
        }
        if self.replied.swap(true, Ordering::SeqCst) {
            return Err(BotError::Reply(format!(
                "Interaction {} was already replied to",
                self.id
            )));
        }
        if let Err(e) = self.responder.respond(&self.id, &self.token, &reply).await {
            self.replied.store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("user", &self.user.tag())
            .field("command", &self.command_name())
            .finish()
    }
}

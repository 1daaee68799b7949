//! Interaction data types.
//!
//! These mirror the subset of the platform's interaction object that the
//! router and command handlers need. Wire payloads are parsed with serde into
//! [`InteractionPayload`] and then bound to a responder to form an
//! [`Interaction`](super::Interaction).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Message flag that limits a reply to the invoking user.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// Callback type for "respond with a message".
pub const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;

/// Kinds of interaction the platform delivers, with their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    MessageComponent,
    Autocomplete,
    ModalSubmit,
}

impl InteractionKind {
    /// Whether an interaction of this kind accepts a message reply.
    pub fn is_repliable(self) -> bool {
        matches!(
            self,
            InteractionKind::ApplicationCommand
                | InteractionKind::MessageComponent
                | InteractionKind::ModalSubmit
        )
    }

    /// Human-readable name used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionKind::Ping => "Ping",
            InteractionKind::ApplicationCommand => "ApplicationCommand",
            InteractionKind::MessageComponent => "MessageComponent",
            InteractionKind::Autocomplete => "ApplicationCommandAutocomplete",
            InteractionKind::ModalSubmit => "ModalSubmit",
        }
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for InteractionKind {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        match code {
            1 => Ok(InteractionKind::Ping),
            2 => Ok(InteractionKind::ApplicationCommand),
            3 => Ok(InteractionKind::MessageComponent),
            4 => Ok(InteractionKind::Autocomplete),
            5 => Ok(InteractionKind::ModalSubmit),
            other => Err(format!("unknown interaction type {}", other)),
        }
    }
}

impl From<InteractionKind> for u8 {
    fn from(kind: InteractionKind) -> u8 {
        match kind {
            InteractionKind::Ping => 1,
            InteractionKind::ApplicationCommand => 2,
            InteractionKind::MessageComponent => 3,
            InteractionKind::Autocomplete => 4,
            InteractionKind::ModalSubmit => 5,
        }
    }
}

/// The user behind an interaction or the bot's own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
}

impl User {
    /// Create a user with a unique username (no legacy discriminator).
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            discriminator: None,
            global_name: None,
        }
    }

    /// `name#1234` for legacy accounts, plain `name` otherwise.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

/// Guild member wrapper; guild interactions carry the user here.
#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: User,
}

/// Command data attached to an application-command or autocomplete interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub options: Vec<Value>,
    #[serde(default)]
    pub custom_id: Option<String>,
}

/// Raw interaction object as delivered by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    pub id: String,
    pub token: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
}

/// A message reply to an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionReply {
    pub content: String,
    pub ephemeral: bool,
}

impl InteractionReply {
    /// A reply visible to everyone in the channel.
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    /// A reply visible only to the invoking user.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }

    /// JSON body for the interaction callback endpoint.
    pub fn to_callback_body(&self) -> Value {
        let mut data = json!({ "content": self.content });
        if self.ephemeral {
            data["flags"] = json!(EPHEMERAL_FLAG);
        }
        json!({
            "type": CHANNEL_MESSAGE_WITH_SOURCE,
            "data": data,
        })
    }
}

//! Descriptor manifest types for Relaybot
//!
//! A manifest is the on-disk form of a descriptor: a JSON document tagged
//! with `kind`. Command manifests carry the platform's application-command
//! schema inline; event manifests name a platform event.
//!
//! # Example command manifest
//!
//! ```json
//! {
//!   "kind": "command",
//!   "name": "test",
//!   "description": "Run the test function.",
//!   "handler": "test"
//! }
//! ```
//!
//! # Example event manifest
//!
//! ```json
//! { "kind": "event", "name": "ready", "once": true }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Platform command type for slash (chat input) commands.
pub const CHAT_INPUT: u8 = 1;

static COMMAND_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-_\p{L}\p{N}]{1,32}$").unwrap());

/// A manifest file, tagged by descriptor kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DescriptorManifest {
    Command(CommandManifest),
    Event(EventManifest),
}

impl DescriptorManifest {
    /// The `kind` tag of this manifest.
    pub fn kind(&self) -> &'static str {
        match self {
            DescriptorManifest::Command(_) => "command",
            DescriptorManifest::Event(_) => "event",
        }
    }
}

/// Command manifest: platform metadata plus the handler binding.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandManifest {
    #[serde(flatten)]
    pub metadata: CommandMetadata,

    /// Handler catalog key. Defaults to the command name.
    #[serde(default)]
    pub handler: Option<String>,
}

/// Event manifest: the event to listen for and how.
#[derive(Debug, Clone, Deserialize)]
pub struct EventManifest {
    pub name: EventName,

    /// Handler catalog key. Defaults to the event name.
    #[serde(default)]
    pub handler: Option<String>,

    /// Listen for the first emission only.
    #[serde(default)]
    pub once: bool,
}

/// Application-command metadata in the shape the platform's bulk
/// registration endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// 1 = slash command, 2 = user context menu, 3 = message context menu.
    #[serde(rename = "type", default = "default_command_type")]
    pub command_type: u8,

    /// Option schema objects, passed through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
}

fn default_command_type() -> u8 {
    CHAT_INPUT
}

impl CommandMetadata {
    /// Slash-command metadata with a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            command_type: CHAT_INPUT,
            options: Vec::new(),
            default_member_permissions: None,
            dm_permission: None,
            nsfw: None,
        }
    }

    /// Check the metadata against the platform's naming rules.
    ///
    /// - Name: 1-32 letters, digits, `-` or `_`; lowercase for slash commands
    /// - Description: 1-100 characters for slash commands
    /// - Type: 1, 2 or 3
    pub fn validate(&self) -> std::result::Result<(), ShapeMismatch> {
        if !(1..=3).contains(&self.command_type) {
            return Err(ShapeMismatch::invalid(
                "type",
                format!("unknown command type {}", self.command_type),
            ));
        }

        if self.command_type == CHAT_INPUT {
            if !COMMAND_NAME_RE.is_match(&self.name) {
                return Err(ShapeMismatch::invalid(
                    "name",
                    format!(
                        "'{}' must be 1-32 letters, digits, hyphens or underscores",
                        self.name
                    ),
                ));
            }
            if self.name.to_lowercase() != self.name {
                return Err(ShapeMismatch::invalid(
                    "name",
                    format!("'{}' must be lowercase", self.name),
                ));
            }
            let len = self.description.chars().count();
            if !(1..=100).contains(&len) {
                return Err(ShapeMismatch::invalid(
                    "description",
                    format!("must be 1-100 characters, got {}", len),
                ));
            }
        } else {
            let len = self.name.chars().count();
            if !(1..=32).contains(&len) {
                return Err(ShapeMismatch::invalid(
                    "name",
                    format!("must be 1-32 characters, got {}", len),
                ));
            }
        }

        Ok(())
    }
}

/// Platform events a descriptor may subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    Ready,
    InteractionCreate,
    GuildCreate,
    GuildDelete,
    MessageCreate,
    Error,
    Warn,
    Debug,
}

impl EventName {
    /// The identifier used in manifests and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Ready => "ready",
            EventName::InteractionCreate => "interactionCreate",
            EventName::GuildCreate => "guildCreate",
            EventName::GuildDelete => "guildDelete",
            EventName::MessageCreate => "messageCreate",
            EventName::Error => "error",
            EventName::Warn => "warn",
            EventName::Debug => "debug",
        }
    }

    /// Map a gateway dispatch name (`INTERACTION_CREATE`) to an event.
    pub fn from_gateway(dispatch: &str) -> Option<Self> {
        match dispatch {
            "READY" => Some(EventName::Ready),
            "INTERACTION_CREATE" => Some(EventName::InteractionCreate),
            "GUILD_CREATE" => Some(EventName::GuildCreate),
            "GUILD_DELETE" => Some(EventName::GuildDelete),
            "MESSAGE_CREATE" => Some(EventName::MessageCreate),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a manifest was not admitted by a shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeMismatch {
    /// The document is JSON but not a descriptor manifest.
    #[error("not a descriptor manifest: {0}")]
    NotADescriptor(String),

    /// The manifest is a descriptor of another kind.
    #[error("expected a {expected} descriptor, found a {found} descriptor")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    /// A field violates the platform's rules.
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The manifest names a handler that is not in the catalog.
    #[error("no handler named '{0}'")]
    UnknownHandler(String),
}

impl ShapeMismatch {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ShapeMismatch::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_command_manifest() {
        let manifest: DescriptorManifest = serde_json::from_value(json!({
            "kind": "command",
            "name": "test",
            "description": "Run the test function.",
            "options": [{ "type": 3, "name": "text", "description": "Some text" }]
        }))
        .unwrap();

        match manifest {
            DescriptorManifest::Command(cmd) => {
                assert_eq!(cmd.metadata.name, "test");
                assert_eq!(cmd.metadata.command_type, CHAT_INPUT);
                assert_eq!(cmd.metadata.options.len(), 1);
                assert!(cmd.handler.is_none());
            }
            other => panic!("unexpected manifest: {:?}", other),
        }
    }

    #[test]
    fn test_parse_event_manifest() {
        let manifest: DescriptorManifest = serde_json::from_value(json!({
            "kind": "event",
            "name": "interactionCreate"
        }))
        .unwrap();

        match manifest {
            DescriptorManifest::Event(ev) => {
                assert_eq!(ev.name, EventName::InteractionCreate);
                assert!(!ev.once);
            }
            other => panic!("unexpected manifest: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_name_is_rejected() {
        let result = serde_json::from_value::<DescriptorManifest>(json!({
            "kind": "event",
            "name": "notAnEvent"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_kind_is_rejected() {
        let result = serde_json::from_value::<DescriptorManifest>(json!({ "name": "test" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_metadata_serializes_platform_shape() {
        let value = serde_json::to_value(CommandMetadata::new("ping", "Pong")).unwrap();
        assert_eq!(value, json!({ "name": "ping", "description": "Pong", "type": 1 }));
    }

    #[test]
    fn test_validate_accepts_platform_names() {
        assert!(CommandMetadata::new("test", "x").validate().is_ok());
        assert!(CommandMetadata::new("set-role_2", "x").validate().is_ok());
        assert!(CommandMetadata::new("grüße", "x").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let too_long = "a".repeat(33);
        for name in ["", "has space", "UPPER", too_long.as_str(), "semi;colon"] {
            let err = CommandMetadata::new(name, "x").validate().unwrap_err();
            assert!(matches!(err, ShapeMismatch::Invalid { field: "name", .. }), "{}", name);
        }
    }

    #[test]
    fn test_validate_description_length() {
        assert!(CommandMetadata::new("test", "").validate().is_err());
        assert!(CommandMetadata::new("test", "d".repeat(101)).validate().is_err());
        assert!(CommandMetadata::new("test", "d".repeat(100)).validate().is_ok());
    }

    #[test]
    fn test_context_menu_allows_spaces_and_no_description() {
        let mut meta = CommandMetadata::new("Report Message", "");
        meta.command_type = 3;
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn test_event_names_round_trip_gateway() {
        assert_eq!(EventName::from_gateway("READY"), Some(EventName::Ready));
        assert_eq!(
            EventName::from_gateway("INTERACTION_CREATE").map(EventName::as_str),
            Some("interactionCreate")
        );
        assert_eq!(EventName::from_gateway("TYPING_START"), None);
    }
}

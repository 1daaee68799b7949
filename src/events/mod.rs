//! Platform events for Relaybot
//!
//! An event is an [`EventDescriptor`]: the event name, a handler, and
//! whether it should fire once or on every emission.
//!
//! - **emitter**: `EventSource` and the in-process `EventEmitter`
//! - **registry**: `EventRegistry`, discovery and subscription
//! - **builtin**: handlers shipped with the bot

pub mod builtin;
pub mod emitter;
pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::descriptors::{
    DescriptorManifest, DescriptorShape, EventName, HandlerCatalog, ShapeMismatch,
};
use crate::error::Result;
use crate::interaction::{Interaction, User};

pub use builtin::{builtin_events, ReadyAnnouncer};
pub use emitter::{EventEmitter, EventSource, Listener};
pub use registry::EventRegistry;

/// One positional argument of an emission.
#[derive(Debug, Clone)]
pub enum EventArg {
    /// An inbound interaction (`interactionCreate`).
    Interaction(Arc<Interaction>),
    /// A user, e.g. the bot's own account on `ready`.
    User(User),
    /// Raw gateway data for events without a typed model.
    Json(Value),
}

/// Arguments of one emission, shared by every listener.
pub type EventArgs = Arc<[EventArg]>;

/// Code that runs when a subscribed event fires.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, args: EventArgs) -> Result<()>;
}

/// A loaded event subscription.
#[derive(Clone)]
pub struct EventDescriptor {
    pub name: EventName,
    pub handler: Arc<dyn EventHandler>,
    pub once: bool,
}

impl EventDescriptor {
    pub fn new(name: EventName, handler: Arc<dyn EventHandler>, once: bool) -> Self {
        Self {
            name,
            handler,
            once,
        }
    }
}

impl std::fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("name", &self.name)
            .field("once", &self.once)
            .finish_non_exhaustive()
    }
}

/// Shape admitting event manifests whose handler resolves in `catalog`.
///
/// The handler key defaults to the event name (`ready`, `interactionCreate`).
pub struct EventShape<'a> {
    catalog: &'a HandlerCatalog<dyn EventHandler>,
}

impl<'a> EventShape<'a> {
    pub fn new(catalog: &'a HandlerCatalog<dyn EventHandler>) -> Self {
        Self { catalog }
    }
}

impl DescriptorShape for EventShape<'_> {
    type Output = EventDescriptor;

    fn kind(&self) -> &'static str {
        "BotEvent"
    }

    fn admit(
        &self,
        manifest: DescriptorManifest,
    ) -> std::result::Result<EventDescriptor, ShapeMismatch> {
        let event = match manifest {
            DescriptorManifest::Event(event) => event,
            other => {
                return Err(ShapeMismatch::WrongKind {
                    expected: "event",
                    found: other.kind(),
                })
            }
        };

        let key = event
            .handler
            .unwrap_or_else(|| event.name.as_str().to_string());
        let handler = self
            .catalog
            .get(&key)
            .ok_or(ShapeMismatch::UnknownHandler(key))?;

        Ok(EventDescriptor::new(event.name, handler, event.once))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Noop;

    #[async_trait]
    impl EventHandler for Noop {
        async fn handle(&self, _args: EventArgs) -> Result<()> {
            Ok(())
        }
    }

    fn manifest(value: Value) -> DescriptorManifest {
        serde_json::from_value(value).unwrap()
    }

    fn catalog() -> HandlerCatalog<dyn EventHandler> {
        HandlerCatalog::<dyn EventHandler>::new()
            .with("ready", Arc::new(Noop))
            .with("audit", Arc::new(Noop))
    }

    #[test]
    fn test_admits_event_by_name() {
        let catalog = catalog();
        let descriptor = EventShape::new(&catalog)
            .admit(manifest(json!({ "kind": "event", "name": "ready", "once": true })))
            .unwrap();
        assert_eq!(descriptor.name, EventName::Ready);
        assert!(descriptor.once);
    }

    #[test]
    fn test_once_defaults_to_false() {
        let catalog = catalog();
        let descriptor = EventShape::new(&catalog)
            .admit(manifest(json!({
                "kind": "event", "name": "guildCreate", "handler": "audit"
            })))
            .unwrap();
        assert_eq!(descriptor.name, EventName::GuildCreate);
        assert!(!descriptor.once);
    }

    #[test]
    fn test_rejects_command_manifest() {
        let catalog = catalog();
        let err = EventShape::new(&catalog)
            .admit(manifest(json!({
                "kind": "command", "name": "test", "description": "Run the test function."
            })))
            .unwrap_err();
        assert!(matches!(err, ShapeMismatch::WrongKind { found: "command", .. }));
    }

    #[test]
    fn test_rejects_missing_handler() {
        let catalog = catalog();
        let err = EventShape::new(&catalog)
            .admit(manifest(json!({ "kind": "event", "name": "messageCreate" })))
            .unwrap_err();
        assert_eq!(err, ShapeMismatch::UnknownHandler("messageCreate".to_string()));
    }
}

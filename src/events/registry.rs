//! Event discovery and subscription.
//!
//! `EventRegistry` holds the event descriptors found under the events
//! directory and attaches each one to an [`EventSource`], with `once` or
//! `on` semantics as the manifest requests.

use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::descriptors::{EventName, FileLoader, HandlerCatalog};

use super::emitter::{EventSource, Listener};
use super::{EventArgs, EventDescriptor, EventHandler, EventShape};

/// Event descriptors in discovery order.
#[derive(Debug, Default)]
pub struct EventRegistry {
    descriptors: Vec<EventDescriptor>,
}

impl EventRegistry {
    pub fn new(descriptors: Vec<EventDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Discover event manifests in `dir_name`.
    pub fn discover(
        loader: &FileLoader,
        dir_name: &str,
        catalog: &HandlerCatalog<dyn EventHandler>,
    ) -> Self {
        let descriptors = loader.load(dir_name, &EventShape::new(catalog));
        debug!(events = descriptors.len(), "Event descriptors discovered");
        Self::new(descriptors)
    }

    /// Attach every descriptor to `source`. Returns how many were attached.
    pub fn subscribe(&self, source: &dyn EventSource) -> usize {
        for descriptor in &self.descriptors {
            let listener = trampoline(descriptor.name, Arc::clone(&descriptor.handler));
            if descriptor.once {
                source.once(descriptor.name, listener);
            } else {
                source.on(descriptor.name, listener);
            }
            debug!(event = %descriptor.name, once = descriptor.once, "Subscribed event handler");
        }
        info!(events = self.descriptors.len(), "Event handlers subscribed");
        self.descriptors.len()
    }

    /// Discover event manifests and subscribe them in one step.
    pub fn discover_and_subscribe(
        loader: &FileLoader,
        dir_name: &str,
        catalog: &HandlerCatalog<dyn EventHandler>,
        source: &dyn EventSource,
    ) -> Self {
        let registry = Self::discover(loader, dir_name, catalog);
        registry.subscribe(source);
        registry
    }

    pub fn descriptors(&self) -> &[EventDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Listener forwarding the emission's arguments to `handler`.
fn trampoline(event: EventName, handler: Arc<dyn EventHandler>) -> Listener {
    Arc::new(move |args: EventArgs| {
        let handler = Arc::clone(&handler);
        async move {
            if let Err(e) = handler.handle(args).await {
                error!(event = %event, error = %e, "Event handler failed");
            }
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BotError, Result};
    use crate::events::EventEmitter;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for Counting {
        async fn handle(&self, _args: EventArgs) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        async fn handle(&self, _args: EventArgs) -> Result<()> {
            Err(BotError::Handler("nope".to_string()))
        }
    }

    fn write(dir: &TempDir, file: &str, body: &str) {
        let events = dir.path().join("events");
        fs::create_dir_all(&events).unwrap();
        fs::write(events.join(file), body).unwrap();
    }

    #[tokio::test]
    async fn test_ready_once_fires_a_single_time() {
        let dir = TempDir::new().unwrap();
        write(&dir, "ready.json", r#"{"kind": "event", "name": "ready", "once": true}"#);

        let calls = Arc::new(AtomicUsize::new(0));
        let catalog = HandlerCatalog::<dyn EventHandler>::new()
            .with("ready", Arc::new(Counting(Arc::clone(&calls))));
        let emitter = EventEmitter::new();

        let registry = EventRegistry::discover_and_subscribe(
            &FileLoader::new(dir.path()),
            "events",
            &catalog,
            &emitter,
        );
        assert_eq!(registry.len(), 1);

        for _ in 0..3 {
            emitter.emit(EventName::Ready, vec![]);
        }
        emitter.drain().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_on_handler_fires_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = EventRegistry::new(vec![EventDescriptor::new(
            EventName::MessageCreate,
            Arc::new(Counting(Arc::clone(&calls))),
            false,
        )]);
        let emitter = EventEmitter::new();
        assert_eq!(registry.subscribe(&emitter), 1);

        for _ in 0..3 {
            emitter.emit(EventName::MessageCreate, vec![]);
        }
        emitter.drain().await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failing_handler_stays_subscribed() {
        let registry = EventRegistry::new(vec![EventDescriptor::new(
            EventName::GuildCreate,
            Arc::new(Failing),
            false,
        )]);
        let emitter = EventEmitter::new();
        registry.subscribe(&emitter);

        assert_eq!(emitter.emit(EventName::GuildCreate, vec![]), 1);
        emitter.drain().await;
        assert_eq!(emitter.listener_count(EventName::GuildCreate), 1);
    }

    #[test]
    fn test_discover_skips_commands_and_unknown_handlers() {
        let dir = TempDir::new().unwrap();
        write(&dir, "ready.json", r#"{"kind": "event", "name": "ready", "once": true}"#);
        write(
            &dir,
            "stray.json",
            r#"{"kind": "command", "name": "test", "description": "Misplaced"}"#,
        );
        write(&dir, "message.json", r#"{"kind": "event", "name": "messageCreate"}"#);

        let catalog = HandlerCatalog::<dyn EventHandler>::new()
            .with("ready", Arc::new(Counting(Arc::new(AtomicUsize::new(0)))));
        let registry = EventRegistry::discover(&FileLoader::new(dir.path()), "events", &catalog);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.descriptors()[0].name, EventName::Ready);
    }

    #[test]
    fn test_missing_directory_yields_empty_registry() {
        let dir = TempDir::new().unwrap();
        let catalog = HandlerCatalog::<dyn EventHandler>::new();
        let registry = EventRegistry::discover(&FileLoader::new(dir.path()), "events", &catalog);
        assert!(registry.is_empty());
    }
}

//! Startup wiring for Relaybot
//!
//! [`Bot::start`] runs the two discovery passes: commands are loaded and
//! published in the background, event descriptors are subscribed to the
//! emitter. [`Bot::feed`] then turns newline-delimited JSON into emissions,
//! and [`Bot::shutdown`] waits for the publish and for handlers in flight.
//!
//! Handlers come from the built-in catalogs plus any [`Plugins`] passed to
//! [`Bot::start_with`]; plugin handlers replace built-ins of the same name.
//!
//! # Feed format
//!
//! Each line is either a gateway dispatch frame or a bare interaction:
//!
//! ```text
//! {"t": "READY", "d": {"user": {"id": "1", "username": "relaybot"}}}
//! {"t": "INTERACTION_CREATE", "d": {"id": "2", "token": "t", "type": 2, ...}}
//! {"id": "3", "token": "t", "type": 2, "data": {"name": "test"}, ...}
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::commands::{builtin_commands, CommandHandler, CommandPublisher, CommandRegistry};
use crate::config::Config;
use crate::descriptors::{EventName, FileLoader, HandlerCatalog};
use crate::error::{BotError, Result};
use crate::events::{builtin_events, EventArg, EventEmitter, EventHandler, EventRegistry};
use crate::interaction::{Interaction, InteractionPayload, InteractionResponder, User};

/// Handlers supplied by the embedding application.
#[derive(Default)]
pub struct Plugins {
    pub commands: HandlerCatalog<dyn CommandHandler>,
    pub events: HandlerCatalog<dyn EventHandler>,
}

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command handler under `name`.
    pub fn with_command(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        self.commands.insert(name, handler);
        self
    }

    /// Register an event handler under `name`.
    pub fn with_event(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn EventHandler>,
    ) -> Self {
        self.events.insert(name, handler);
        self
    }
}

/// Build the command registry described by `config` from `catalog`.
pub fn load_commands(
    config: &Config,
    catalog: &HandlerCatalog<dyn CommandHandler>,
) -> Result<CommandRegistry> {
    let loader = FileLoader::new(&config.plugins.root);
    let registry = CommandRegistry::discover(
        &loader,
        &config.plugins.commands_dir,
        catalog,
        config.commands.reject_duplicates,
    )?;
    Ok(registry.with_timeout(dispatch_timeout(config)))
}

/// Per-dispatch limit; `0` disables it.
pub fn dispatch_timeout(config: &Config) -> Option<Duration> {
    match config.dispatch.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    }
}

/// Counters for one [`Bot::feed`] run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    /// Lines turned into an emission.
    pub emitted: usize,
    /// Blank, malformed or unrecognised lines.
    pub skipped: usize,
}

/// A started bot: registries wired to an emitter.
pub struct Bot {
    commands: Arc<CommandRegistry>,
    events: EventRegistry,
    emitter: Arc<EventEmitter>,
    publish_task: Option<JoinHandle<Result<()>>>,
}

impl Bot {
    /// Start with the built-in handlers only.
    pub fn start(
        config: &Config,
        publisher: Arc<dyn CommandPublisher>,
        emitter: Arc<EventEmitter>,
    ) -> Result<Self> {
        Self::start_with(config, Plugins::default(), publisher, emitter)
    }

    /// Discover and publish commands, then discover and subscribe events.
    ///
    /// Publishing runs in the background; a failed publish is logged and
    /// does not stop the bot.
    pub fn start_with(
        config: &Config,
        plugins: Plugins,
        publisher: Arc<dyn CommandPublisher>,
        emitter: Arc<EventEmitter>,
    ) -> Result<Self> {
        let command_catalog = builtin_commands().merge(plugins.commands);
        let commands = Arc::new(load_commands(config, &command_catalog)?);
        let publish_task = commands.spawn_publish(publisher, config.publish_target());

        let loader = FileLoader::new(&config.plugins.root);
        let event_catalog = builtin_events(Arc::clone(&commands)).merge(plugins.events);
        let events = EventRegistry::discover_and_subscribe(
            &loader,
            &config.plugins.events_dir,
            &event_catalog,
            emitter.as_ref(),
        );

        info!(
            commands = commands.len(),
            events = events.len(),
            debug_mode = config.debug.enabled,
            "Bot started"
        );

        Ok(Self {
            commands,
            events,
            emitter,
            publish_task: Some(publish_task),
        })
    }

    pub fn commands(&self) -> &Arc<CommandRegistry> {
        &self.commands
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn emitter(&self) -> &Arc<EventEmitter> {
        &self.emitter
    }

    /// Handle of the background publish, if not taken yet.
    pub fn take_publish_task(&mut self) -> Option<JoinHandle<Result<()>>> {
        self.publish_task.take()
    }

    /// Emit `ready` for the bot's own account.
    pub fn ready(&self, user: User) -> usize {
        self.emitter.emit(EventName::Ready, vec![EventArg::User(user)])
    }

    /// Read frames from `reader` until EOF and emit them.
    ///
    /// Emitting does not wait for handlers, so a slow handler never holds
    /// back later frames.
    pub async fn feed<R>(
        &self,
        reader: R,
        responder: Arc<dyn InteractionResponder>,
    ) -> Result<FeedStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut stats = FeedStats::default();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                stats.skipped += 1;
                continue;
            }

            match parse_frame(line, &responder) {
                Ok(Some((event, args))) => {
                    self.emitter.emit(event, args);
                    stats.emitted += 1;
                }
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed frame");
                    stats.skipped += 1;
                }
            }
        }

        debug!(emitted = stats.emitted, skipped = stats.skipped, "Feed ended");
        Ok(stats)
    }

    /// Wait for the background publish and every handler still running.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.publish_task.take() {
            match task.await {
                Ok(Ok(())) => debug!("Publish finished before shutdown"),
                Ok(Err(e)) => warn!(error = %e, "Publish failed before shutdown"),
                Err(e) => error!(error = %e, "Publish task was cancelled"),
            }
        }
        self.emitter.drain().await;
        debug!("Bot stopped");
    }
}

/// Turn one line into an event and its arguments.
///
/// `Ok(None)` means the frame is valid but names no known event.
fn parse_frame(
    line: &str,
    responder: &Arc<dyn InteractionResponder>,
) -> Result<Option<(EventName, Vec<EventArg>)>> {
    let value: Value = serde_json::from_str(line)?;

    let Some(dispatch) = value.get("t").and_then(Value::as_str) else {
        let payload: InteractionPayload = serde_json::from_value(value)?;
        let interaction = Interaction::from_payload(payload, Arc::clone(responder))?;
        return Ok(Some((
            EventName::InteractionCreate,
            vec![EventArg::Interaction(Arc::new(interaction))],
        )));
    };

    let Some(event) = EventName::from_gateway(dispatch) else {
        debug!(dispatch, "Ignoring unrecognised dispatch");
        return Ok(None);
    };

    let data = value.get("d").cloned().unwrap_or(Value::Null);
    let args = match event {
        EventName::Ready => {
            let user = data
                .get("user")
                .cloned()
                .ok_or_else(|| BotError::Dispatch("READY frame has no user".to_string()))?;
            vec![EventArg::User(serde_json::from_value(user)?)]
        }
        EventName::InteractionCreate => {
            let payload: InteractionPayload = serde_json::from_value(data)?;
            let interaction = Interaction::from_payload(payload, Arc::clone(responder))?;
            vec![EventArg::Interaction(Arc::new(interaction))]
        }
        _ => vec![EventArg::Json(data)],
    };

    Ok(Some((event, args)))
}

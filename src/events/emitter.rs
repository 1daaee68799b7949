//! In-process event source.
//!
//! `EventEmitter` keeps listeners per event name and fans each emission out
//! to them. `once` listeners are removed under the lock before they run, so
//! they fire for exactly one emission even when emissions race.
//!
//! Emitting never waits for listeners. Each one runs on a detached task that
//! logs its own panic; [`EventEmitter::drain`] waits for the ones in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::BoxFuture;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::descriptors::EventName;

use super::{EventArg, EventArgs};

/// Callback invoked with the positional arguments of an emission.
pub type Listener = Arc<dyn Fn(EventArgs) -> BoxFuture<'static, ()> + Send + Sync>;

/// Anything that delivers named events to listeners.
pub trait EventSource: Send + Sync {
    /// Listen for every emission of `event`.
    fn on(&self, event: EventName, listener: Listener);

    /// Listen for the next emission of `event` only.
    fn once(&self, event: EventName, listener: Listener);
}

struct Subscription {
    listener: Listener,
    once: bool,
}

/// Event source living inside the process.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use futures::FutureExt;
/// use relaybot::descriptors::EventName;
/// use relaybot::events::{EventArgs, EventEmitter, EventSource};
///
/// # tokio_test::block_on(async {
/// let emitter = EventEmitter::new();
/// emitter.once(EventName::Ready, Arc::new(|_args: EventArgs| async {}.boxed()));
///
/// assert_eq!(emitter.emit(EventName::Ready, vec![]), 1);
/// assert_eq!(emitter.emit(EventName::Ready, vec![]), 0);
/// emitter.drain().await;
/// # });
/// ```
#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<HashMap<EventName, Vec<Subscription>>>,
    in_flight: Mutex<JoinSet<()>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<EventName, Vec<Subscription>>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn add(&self, event: EventName, listener: Listener, once: bool) {
        self.table()
            .entry(event)
            .or_default()
            .push(Subscription { listener, once });
    }

    /// Number of listeners currently subscribed to `event`.
    pub fn listener_count(&self, event: EventName) -> usize {
        self.table().get(&event).map_or(0, |subs| subs.len())
    }

    fn in_flight(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start every listener of `event` with `args`.
    ///
    /// Returns how many listeners were started without waiting for them. A
    /// listener that panics or never finishes does not affect the others or
    /// later emissions. Must be called inside a Tokio runtime.
    pub fn emit(&self, event: EventName, args: Vec<EventArg>) -> usize {
        let listeners: Vec<Listener> = {
            let mut table = self.table();
            match table.get_mut(&event) {
                Some(subs) => {
                    let current: Vec<Listener> =
                        subs.iter().map(|s| Arc::clone(&s.listener)).collect();
                    subs.retain(|s| !s.once);
                    current
                }
                None => Vec::new(),
            }
        };

        if listeners.is_empty() {
            debug!(event = %event, "No listeners for event");
            return 0;
        }

        let args: EventArgs = args.into();
        let mut in_flight = self.in_flight();
        while in_flight.try_join_next().is_some() {}

        for listener in &listeners {
            let task = tokio::spawn(listener(Arc::clone(&args)));
            in_flight.spawn(async move {
                if let Err(e) = task.await {
                    error!(event = %event, error = %e, "Event listener panicked");
                }
            });
        }

        listeners.len()
    }

    /// Wait until every listener started so far has finished, including
    /// listeners started by emissions made while waiting.
    pub async fn drain(&self) {
        loop {
            let mut pending = std::mem::take(&mut *self.in_flight());
            if pending.is_empty() {
                return;
            }
            while let Some(joined) = pending.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Event listener task was cancelled");
                }
            }
        }
    }
}

impl EventSource for EventEmitter {
    fn on(&self, event: EventName, listener: Listener) {
        self.add(event, listener, false);
    }

    fn once(&self, event: EventName, listener: Listener) {
        self.add(event, listener, true);
    }
}

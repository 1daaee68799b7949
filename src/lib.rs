//! Relaybot - slash-command and event bot built from declarative descriptors

pub mod bot;
pub mod commands;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod events;
pub mod interaction;
pub mod utils;

pub use bot::Bot;
pub use config::Config;
pub use error::{BotError, Result};

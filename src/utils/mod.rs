//! Utility modules for Relaybot

pub mod logging;

pub use logging::{default_directive, init_logging};

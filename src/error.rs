//! Error types for Relaybot
//!
//! This module defines the error types used throughout the registry and
//! dispatch layers. Uses `thiserror` for ergonomic error handling with
//! automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// The primary error type for Relaybot operations.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration-related errors (missing ids, absent tokens, duplicate names, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A descriptor file could not be read or parsed
    #[error("Load error: {0}")]
    Load(String),

    /// Remote command registration failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// Command dispatch could not be completed
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Replying to an interaction failed
    #[error("Reply error: {0}")]
    Reply(String),

    /// A user-supplied command or event handler reported a failure
    #[error("Handler error: {0}")]
    Handler(String),

    /// A handler did not finish within the dispatch timeout
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A specialized `Result` type for Relaybot operations.
pub type Result<T> = std::result::Result<T, BotError>;

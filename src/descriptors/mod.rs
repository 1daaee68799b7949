//! Descriptor discovery for Relaybot
//!
//! Commands and events are declared as JSON manifests in two directories
//! below the plugin root. Each manifest names a handler from a catalog
//! compiled into the binary, so discovery never loads code at runtime.
//!
//! # Architecture
//!
//! - **types**: Manifest structures (`DescriptorManifest`, `CommandMetadata`, `EventName`)
//! - **catalog**: `HandlerCatalog` and the `DescriptorShape` admission contract
//! - **loader**: `FileLoader`, the directory scan
//!
//! # Plugin Directory Structure
//!
//! ```text
//! <plugin root>/
//! ├── commands/
//! │   └── test.json
//! └── events/
//!     ├── interactionCreate.json
//!     └── ready.json
//! ```

pub mod catalog;
mod loader;
pub mod types;

pub use catalog::{DescriptorShape, HandlerCatalog};
pub use loader::{FailedFile, FileLoader, LoadReport, SkippedFile, MANIFEST_EXTENSION};
pub use types::{
    CommandManifest, CommandMetadata, DescriptorManifest, EventManifest, EventName, ShapeMismatch,
    CHAT_INPUT,
};

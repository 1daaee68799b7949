//! Handler catalogs and the descriptor shape contract.
//!
//! Manifests on disk only carry data; the code that runs lives in a
//! [`HandlerCatalog`] assembled at build time. A [`DescriptorShape`] binds a
//! parsed manifest to a catalog entry and either admits it as a typed
//! descriptor or explains why it does not conform.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::{DescriptorManifest, ShapeMismatch};

/// Statically-known handlers, addressable by name.
pub struct HandlerCatalog<H: ?Sized> {
    handlers: HashMap<String, Arc<H>>,
}

impl<H: ?Sized> HandlerCatalog<H> {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, handler: Arc<H>) -> Self {
        self.insert(name, handler);
        self
    }

    /// Add or replace a handler.
    pub fn insert(&mut self, name: impl Into<String>, handler: Arc<H>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Look up a handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<H>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Add every handler from `other`, replacing entries with the same name.
    pub fn merge(mut self, other: HandlerCatalog<H>) -> Self {
        self.handlers.extend(other.handlers);
        self
    }

    /// Handler names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl<H: ?Sized> Default for HandlerCatalog<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// The expected shape of a descriptor kind.
///
/// `FileLoader` hands every parsed manifest to `admit`; only `Ok` values are
/// returned to the caller.
pub trait DescriptorShape {
    /// The typed descriptor produced for conforming manifests.
    type Output;

    /// Descriptor kind name used in log lines (e.g. `"BotCommand"`).
    fn kind(&self) -> &'static str;

    /// Admit a manifest or report why it does not conform.
    fn admit(&self, manifest: DescriptorManifest) -> Result<Self::Output, ShapeMismatch>;
}

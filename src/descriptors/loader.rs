//! Descriptor discovery for Relaybot
//!
//! `FileLoader` scans a single directory (no recursion) below a fixed root,
//! parses every manifest file with the source extension and keeps the ones a
//! [`DescriptorShape`] admits. Nothing here is fatal: bad directories, files
//! that fail to load and non-conforming manifests are logged and skipped.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{BotError, Result};

use super::catalog::DescriptorShape;
use super::types::{DescriptorManifest, ShapeMismatch};

/// File extension of descriptor manifests.
pub const MANIFEST_EXTENSION: &str = "json";

/// A file that was not admitted, and why.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: ShapeMismatch,
}

/// A file that could not be loaded at all.
#[derive(Debug)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: BotError,
}

/// Outcome of one directory scan.
#[derive(Debug)]
pub struct LoadReport<T> {
    /// Admitted descriptors, in load order.
    pub admitted: Vec<T>,
    /// Parsed files the shape rejected.
    pub skipped: Vec<SkippedFile>,
    /// Files that could not be read or parsed.
    pub failed: Vec<FailedFile>,
}

impl<T> LoadReport<T> {
    fn empty() -> Self {
        Self {
            admitted: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Loads descriptor manifests from directories below a root.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
    extension: String,
}

impl FileLoader {
    /// Create a loader resolving directory names against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: MANIFEST_EXTENSION.to_string(),
        }
    }

    /// Use a different manifest file extension (without the dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every manifest in `dir_name` that `shape` admits.
    ///
    /// Returns an empty list when the directory name is invalid or the
    /// directory cannot be listed; callers treat that as "no descriptors".
    pub fn load<S: DescriptorShape>(&self, dir_name: &str, shape: &S) -> Vec<S::Output> {
        self.load_with_report(dir_name, shape).admitted
    }

    /// Like [`load`](Self::load), but also returns skipped and failed files.
    pub fn load_with_report<S: DescriptorShape>(
        &self,
        dir_name: &str,
        shape: &S,
    ) -> LoadReport<S::Output> {
        let kind = shape.kind();

        let Some(dir) = self.resolve_dir(dir_name) else {
            warn!(kind, dir = %dir_name, "Cannot load descriptor files from invalid path");
            return LoadReport::empty();
        };

        debug!(kind, dir = %dir.display(), "Loading descriptor files");

        let files = match self.source_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                warn!(kind, dir = %dir.display(), error = %e, "Failed to list descriptor directory");
                return LoadReport::empty();
            }
        };

        let mut report = LoadReport::empty();
        for path in files {
            let value = match read_manifest(&path) {
                Ok(value) => value,
                Err(error) => {
                    warn!(kind, file = %path.display(), error = %error, "Failed to load descriptor file, skipping");
                    report.failed.push(FailedFile { path, error });
                    continue;
                }
            };

            let admitted = serde_json::from_value::<DescriptorManifest>(value)
                .map_err(|e| ShapeMismatch::NotADescriptor(e.to_string()))
                .and_then(|manifest| shape.admit(manifest));

            match admitted {
                Ok(descriptor) => report.admitted.push(descriptor),
                Err(reason) => {
                    debug!(kind, file = %path.display(), reason = %reason, "Skipping non-conforming descriptor");
                    report.skipped.push(SkippedFile { path, reason });
                }
            }
        }

        debug!(kind, count = report.admitted.len(), "Descriptor files loaded");
        report
    }

    /// Resolve `dir_name` below the root, refusing names that escape it.
    fn resolve_dir(&self, dir_name: &str) -> Option<PathBuf> {
        let trimmed = dir_name.trim();
        if trimmed.is_empty() {
            return None;
        }

        let relative = Path::new(trimmed);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }

        let dir = self.root.join(relative);
        if dir.is_dir() {
            Some(dir)
        } else {
            None
        }
    }

    /// Manifest files directly inside `dir`, sorted by file name.
    fn source_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches_extension = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == self.extension);
            if matches_extension {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn read_manifest(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| BotError::Load(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| BotError::Load(format!("Malformed JSON in {}: {}", path.display(), e)))
}

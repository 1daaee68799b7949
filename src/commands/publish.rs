//! Remote command registration.
//!
//! Publishing is a bulk overwrite: the platform's command list for the
//! target becomes exactly the list sent, so repeating a publish with the same
//! commands leaves the remote state unchanged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::config::PublishTarget;
use crate::descriptors::CommandMetadata;
use crate::error::{BotError, Result};

/// Replaces the remote command list for a target.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Overwrite every command registered for `target` with `commands`.
    async fn bulk_overwrite(&self, target: &PublishTarget, commands: &[CommandMetadata])
        -> Result<()>;
}

/// Publisher backed by the platform REST API.
pub struct RestPublisher {
    api_base: String,
    token: String,
    client: reqwest::Client,
}

impl RestPublisher {
    /// Creates a publisher authenticating with the given bot token.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, target: &PublishTarget) -> String {
        format!("{}{}", self.api_base, target.route())
    }
}

#[async_trait]
impl CommandPublisher for RestPublisher {
    async fn bulk_overwrite(
        &self,
        target: &PublishTarget,
        commands: &[CommandMetadata],
    ) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(BotError::Config("Bot token is empty".to_string()));
        }

        let response = self
            .client
            .put(self.url(target))
            .header("Authorization", format!("Bot {}", self.token))
            .json(commands)
            .send()
            .await
            .map_err(|e| BotError::Publish(format!("Failed to call commands API: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BotError::Publish(format!("Failed to read commands API response: {}", e))
        })?;

        if !status.is_success() {
            return Err(BotError::Publish(format!(
                "Commands API returned HTTP {}: {}",
                status, body
            )));
        }

        debug!(scope = target.scope(), count = commands.len(), "Commands API accepted update");
        Ok(())
    }
}

/// Publisher that keeps the "remote" command lists in memory.
///
/// Models the platform's replace semantics; useful for dry runs and tests.
#[derive(Default)]
pub struct MemoryPublisher {
    remote: Mutex<HashMap<String, Vec<CommandMetadata>>>,
    calls: AtomicUsize,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands currently registered for `target`.
    pub fn remote_state(&self, target: &PublishTarget) -> Vec<CommandMetadata> {
        self.remote
            .lock()
            .ok()
            .and_then(|remote| remote.get(&target.route()).cloned())
            .unwrap_or_default()
    }

    /// Number of publish calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandPublisher for MemoryPublisher {
    async fn bulk_overwrite(
        &self,
        target: &PublishTarget,
        commands: &[CommandMetadata],
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut remote = self
            .remote
            .lock()
            .map_err(|_| BotError::Publish("remote state poisoned".to_string()))?;
        remote.insert(target.route(), commands.to_vec());
        Ok(())
    }
}

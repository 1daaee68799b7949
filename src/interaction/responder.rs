//! Reply transport for interactions.
//!
//! [`RestResponder`] posts interaction callbacks to the platform REST API.
//! [`MemoryResponder`] keeps replies in memory for offline runs and tests.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{BotError, Result};

use super::types::InteractionReply;

/// Sends a reply for a given interaction id/token pair.
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Deliver `reply` as the initial response to the interaction.
    async fn respond(&self, interaction_id: &str, token: &str, reply: &InteractionReply)
        -> Result<()>;
}

/// Responder backed by the interaction callback endpoint.
pub struct RestResponder {
    api_base: String,
    client: reqwest::Client,
}

impl RestResponder {
    /// Creates a responder against the given API base URL.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn callback_url(&self, interaction_id: &str, token: &str) -> String {
        format!(
            "{}/interactions/{}/{}/callback",
            self.api_base, interaction_id, token
        )
    }
}

#[async_trait]
impl InteractionResponder for RestResponder {
    async fn respond(
        &self,
        interaction_id: &str,
        token: &str,
        reply: &InteractionReply,
    ) -> Result<()> {
        let response = self
            .client
            .post(self.callback_url(interaction_id, token))
            .json(&reply.to_callback_body())
            .send()
            .await
            .map_err(|e| BotError::Reply(format!("Failed to call callback endpoint: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Reply(format!(
                "Callback endpoint returned HTTP {}: {}",
                status, body
            )));
        }

        debug!(interaction = %interaction_id, "Interaction reply sent");
        Ok(())
    }
}

/// A reply captured by [`MemoryResponder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedReply {
    pub interaction_id: String,
    pub reply: InteractionReply,
}

/// Responder that stores replies instead of sending them.
#[derive(Default)]
pub struct MemoryResponder {
    replies: Mutex<Vec<RecordedReply>>,
}

impl MemoryResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// All replies recorded so far, in send order.
    pub fn replies(&self) -> Vec<RecordedReply> {
        self.replies
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of replies recorded so far.
    pub fn count(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl InteractionResponder for MemoryResponder {
    async fn respond(
        &self,
        interaction_id: &str,
        _token: &str,
        reply: &InteractionReply,
    ) -> Result<()> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| BotError::Reply("reply log poisoned".to_string()))?;
        replies.push(RecordedReply {
            interaction_id: interaction_id.to_string(),
            reply: reply.clone(),
        });
        Ok(())
    }
}

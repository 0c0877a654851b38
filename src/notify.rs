//! Outbound SMS notifications.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("outbound send to {to} failed: {reason}")]
pub struct SendError {
    pub to: String,
    pub reason: String,
}

/// Transport that delivers a message to an address through a tagged
/// endpoint. Returns whether the transport accepted the message.
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    async fn send_to_tag(
        &self,
        to: &str,
        content: &str,
        pool: &str,
        tag: &str,
    ) -> Result<bool, SendError>;
}

/// A message accepted by [`RecordingOutbound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: Uuid,
    pub to: String,
    pub content: String,
    pub pool: String,
    pub tag: String,
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|m| m.to == to)
            .map(|m| m.content)
            .collect()
    }
}

#[async_trait]
impl OutboundChannel for RecordingOutbound {
    async fn send_to_tag(
        &self,
        to: &str,
        content: &str,
        pool: &str,
        tag: &str,
    ) -> Result<bool, SendError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentMessage {
                message_id: Uuid::new_v4(),
                to: to.to_string(),
                content: content.to_string(),
                pool: pool.to_string(),
                tag: tag.to_string(),
            });
        Ok(true)
    }
}

/// Writes messages to the log instead of a network transport.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutbound;

#[async_trait]
impl OutboundChannel for LogOutbound {
    async fn send_to_tag(
        &self,
        to: &str,
        content: &str,
        pool: &str,
        tag: &str,
    ) -> Result<bool, SendError> {
        let message_id = Uuid::new_v4();
        tracing::info!(%message_id, to, pool, tag, content, "outbound SMS");
        Ok(true)
    }
}

/// Sends SMS through the configured tag. Without a tag every send is a
/// successful no-op.
#[derive(Clone)]
pub struct Notifier {
    sms_tag: Option<(String, String)>,
    channel: Arc<dyn OutboundChannel>,
}

impl Notifier {
    pub fn new(sms_tag: Option<(String, String)>, channel: Arc<dyn OutboundChannel>) -> Self {
        Self { sms_tag, channel }
    }

    /// Never fails the turn: transport errors are logged and read as `false`.
    pub async fn send_sms(&self, to: &str, content: &str) -> bool {
        let Some((pool, tag)) = &self.sms_tag else {
            return true;
        };
        let success = match self.channel.send_to_tag(to, content, pool, tag).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("{e}");
                false
            }
        };
        tracing::info!("SMS sent: {success}");
        success
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sms_tag", &self.sms_tag)
            .finish()
    }
}

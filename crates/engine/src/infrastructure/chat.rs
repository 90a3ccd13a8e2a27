//! Chat sink that writes roll results to the log.

use async_trait::async_trait;

use crate::infrastructure::ports::{ChatError, ChatMessage, ChatPort};

/// Posts roll messages as structured `info` events on the `sheetforge::chat` target.
#[derive(Debug, Default)]
pub struct TracingChat;

impl TracingChat {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChatPort for TracingChat {
    async fn post(&self, message: &ChatMessage) -> Result<(), ChatError> {
        tracing::info!(
            target: "sheetforge::chat",
            speaker_id = %message.speaker_id,
            roll_key = %message.roll_key,
            posted_at = %message.posted_at.to_rfc3339(),
            "{}",
            message.summary()
        );
        Ok(())
    }
}

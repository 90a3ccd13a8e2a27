//! External service ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sheetforge_domain::{ActorId, ComputedPhrase};

use super::error::ChatError;

/// A roll result posted to the table chat, attributed to an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub speaker_id: ActorId,
    pub speaker_name: String,
    pub roll_key: String,
    pub phrase: ComputedPhrase,
    pub posted_at: DateTime<Utc>,
}

impl ChatMessage {
    /// One-line rendering: `Aria rolls attacks.damage: 7 ([1d8: 5] + 2)`.
    pub fn summary(&self) -> String {
        match &self.phrase.explanation {
            Some(explanation) => format!(
                "{} rolls {}: {} ({})",
                self.speaker_name, self.roll_key, self.phrase.result, explanation
            ),
            None => format!(
                "{} rolls {}: {}",
                self.speaker_name, self.roll_key, self.phrase.result
            ),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatPort: Send + Sync {
    async fn post(&self, message: &ChatMessage) -> Result<(), ChatError>;
}

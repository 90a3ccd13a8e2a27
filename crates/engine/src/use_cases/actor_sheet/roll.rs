//! Roll property use case.
//!
//! Resolves the actor, evaluates the roll, and posts the result to chat
//! unless posting is disabled globally or for this roll.

use std::sync::Arc;

use sheetforge_domain::{ActorId, ComputedPhrase, FormulaEvaluator};

use crate::infrastructure::ports::{ActorRepo, ChatMessage, ChatPort, ClockPort};

use super::error::ActorSheetError;
use super::load_actor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollRequest {
    pub key: String,
    pub alternative: bool,
    /// Keep the result out of chat.
    pub quiet: bool,
}

impl RollRequest {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alternative: false,
            quiet: false,
        }
    }

    pub fn alternative(mut self) -> Self {
        self.alternative = true;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollOutcome {
    pub phrase: ComputedPhrase,
    pub message: Option<ChatMessage>,
}

pub struct RollProperty {
    actor_repo: Arc<dyn ActorRepo>,
    evaluator: Arc<dyn FormulaEvaluator>,
    chat: Arc<dyn ChatPort>,
    clock: Arc<dyn ClockPort>,
    post_rolls: bool,
}

impl RollProperty {
    pub fn new(
        actor_repo: Arc<dyn ActorRepo>,
        evaluator: Arc<dyn FormulaEvaluator>,
        chat: Arc<dyn ChatPort>,
        clock: Arc<dyn ClockPort>,
        post_rolls: bool,
    ) -> Self {
        Self {
            actor_repo,
            evaluator,
            chat,
            clock,
            post_rolls,
        }
    }

    pub async fn execute(
        &self,
        actor_id: ActorId,
        request: RollRequest,
    ) -> Result<RollOutcome, ActorSheetError> {
        let actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        let derived = actor.prepare_derived_data(self.evaluator.as_ref())?;
        let phrase = actor.roll(
            &derived,
            &request.key,
            request.alternative,
            self.evaluator.as_ref(),
        )?;

        if !self.post_rolls || request.quiet {
            return Ok(RollOutcome {
                phrase,
                message: None,
            });
        }

        let message = ChatMessage {
            speaker_id: actor.id,
            speaker_name: actor.name.clone(),
            roll_key: request.key,
            phrase: phrase.clone(),
            posted_at: self.clock.now(),
        };
        self.chat.post(&message).await?;

        Ok(RollOutcome {
            phrase,
            message: Some(message),
        })
    }
}

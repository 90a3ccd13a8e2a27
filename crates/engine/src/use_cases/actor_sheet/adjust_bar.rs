//! Adjust bar use case.
//!
//! Applies token HUD input (`=7`, `+3`, `-3`) to a resolved bar and stores
//! the new current value.

use std::sync::Arc;

use sheetforge_domain::{ActorId, AttributeBar, BarAdjustment, BarDisplay, FormulaEvaluator};

use crate::infrastructure::ports::ActorRepo;

use super::error::ActorSheetError;
use super::load_actor;

pub struct AdjustBar {
    actor_repo: Arc<dyn ActorRepo>,
    evaluator: Arc<dyn FormulaEvaluator>,
}

impl AdjustBar {
    pub fn new(actor_repo: Arc<dyn ActorRepo>, evaluator: Arc<dyn FormulaEvaluator>) -> Self {
        Self {
            actor_repo,
            evaluator,
        }
    }

    pub async fn execute(
        &self,
        actor_id: ActorId,
        key: &str,
        input: &str,
        display: BarDisplay,
    ) -> Result<AttributeBar, ActorSheetError> {
        let adjustment: BarAdjustment = input.parse()?;

        let mut actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        let derived = actor.prepare_derived_data(self.evaluator.as_ref())?;
        let previous = derived.bar(key).map(|bar| bar.value);

        let bar = actor.adjust_bar(&derived, key, adjustment, display)?;

        if previous != Some(bar.value) {
            self.actor_repo.save(&actor).await?;
            tracing::info!(actor_id = %actor_id, bar = %key, value = bar.value, "Bar adjusted");
        }

        Ok(bar)
    }
}

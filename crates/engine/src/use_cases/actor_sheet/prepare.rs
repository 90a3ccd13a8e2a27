//! Prepare derived data use case.

use std::sync::Arc;

use sheetforge_domain::{ActorId, DerivedData, FormulaEvaluator};

use crate::infrastructure::ports::ActorRepo;

use super::error::ActorSheetError;
use super::load_actor;

/// Loads an actor and resolves its computed properties and bars.
pub struct PrepareDerivedData {
    actor_repo: Arc<dyn ActorRepo>,
    evaluator: Arc<dyn FormulaEvaluator>,
}

impl PrepareDerivedData {
    pub fn new(actor_repo: Arc<dyn ActorRepo>, evaluator: Arc<dyn FormulaEvaluator>) -> Self {
        Self {
            actor_repo,
            evaluator,
        }
    }

    pub async fn execute(&self, actor_id: ActorId) -> Result<DerivedData, ActorSheetError> {
        let actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        let derived = actor.prepare_derived_data(self.evaluator.as_ref())?;

        if !derived.is_complete() {
            tracing::warn!(
                actor_id = %actor_id,
                keys = ?derived.unresolved.keys().collect::<Vec<_>>(),
                "Some properties were left uncomputed"
            );
        }

        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockActorRepo;
    use crate::use_cases::test_support::{evaluator, sheet};
    use sheetforge_domain::PropertyValue;

    #[tokio::test]
    async fn resolves_the_stored_actor() {
        let actor = sheet();
        let id = actor.id;
        let mut repo = MockActorRepo::new();
        repo.expect_get()
            .withf(move |requested| *requested == id)
            .returning(move |_| Ok(Some(actor.clone())));

        let use_case = PrepareDerivedData::new(Arc::new(repo), evaluator(10));
        let derived = use_case.execute(id).await.expect("derived data");

        assert!(derived.is_complete());
        assert_eq!(
            derived.props.get("hpMax").and_then(PropertyValue::as_number),
            Some(14.0)
        );
        assert_eq!(derived.bar("hp").map(|bar| bar.max), Some(14.0));
    }

    #[tokio::test]
    async fn missing_actor_is_reported() {
        let mut repo = MockActorRepo::new();
        repo.expect_get().returning(|_| Ok(None));

        let use_case = PrepareDerivedData::new(Arc::new(repo), evaluator(10));
        let err = use_case.execute(ActorId::new()).await.unwrap_err();

        assert!(matches!(err, ActorSheetError::ActorNotFound(_)));
    }
}

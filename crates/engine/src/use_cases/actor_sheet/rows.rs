//! Dynamic table row use cases.

use std::sync::Arc;

use sheetforge_domain::ActorId;

use crate::infrastructure::ports::ActorRepo;

use super::error::ActorSheetError;
use super::load_actor;

/// Insert, soft-delete and reorder rows of an actor's dynamic tables.
pub struct TableRows {
    actor_repo: Arc<dyn ActorRepo>,
}

impl TableRows {
    pub fn new(actor_repo: Arc<dyn ActorRepo>) -> Self {
        Self { actor_repo }
    }

    /// Returns the new row id.
    pub async fn insert(&self, actor_id: ActorId, table: &str) -> Result<String, ActorSheetError> {
        let mut actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        let row_id = actor.insert_row(table)?;
        self.actor_repo.save(&actor).await?;

        tracing::debug!(actor_id = %actor_id, table = %table, row = %row_id, "Row inserted");
        Ok(row_id)
    }

    pub async fn delete(
        &self,
        actor_id: ActorId,
        table: &str,
        row_id: &str,
    ) -> Result<(), ActorSheetError> {
        let mut actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        actor.delete_row(table, row_id)?;
        self.actor_repo.save(&actor).await?;
        Ok(())
    }

    pub async fn swap(
        &self,
        actor_id: ActorId,
        table: &str,
        first: &str,
        second: &str,
    ) -> Result<(), ActorSheetError> {
        let mut actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        actor.swap_rows(table, first, second)?;
        self.actor_repo.save(&actor).await?;
        Ok(())
    }
}

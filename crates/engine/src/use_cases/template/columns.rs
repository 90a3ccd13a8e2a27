//! Add table columns use case.

use std::sync::Arc;

use sheetforge_domain::{ActorId, Component};

use crate::infrastructure::ports::ActorRepo;

use super::error::TemplateError;

/// Appends columns to a dynamic table; characters pick them up on reload.
pub struct AddTableColumns {
    actor_repo: Arc<dyn ActorRepo>,
}

impl AddTableColumns {
    pub fn new(actor_repo: Arc<dyn ActorRepo>) -> Self {
        Self { actor_repo }
    }

    pub async fn execute(
        &self,
        actor_id: ActorId,
        table: &str,
        columns: Vec<Component>,
    ) -> Result<(), TemplateError> {
        let mut actor = self
            .actor_repo
            .get(actor_id)
            .await?
            .ok_or(TemplateError::ActorNotFound(actor_id))?;

        let added = columns.len();
        actor.add_table_columns(table, columns)?;
        self.actor_repo.save(&actor).await?;

        tracing::info!(actor_id = %actor_id, table = %table, added, "Table columns added");
        Ok(())
    }
}

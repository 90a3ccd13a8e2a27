//! Item attachment use cases.

use std::sync::Arc;

use sheetforge_domain::{ActorId, Item, ItemAttachment, ItemId};

use crate::infrastructure::ports::ActorRepo;

use super::error::ActorSheetError;
use super::load_actor;

/// Attach dropped items, keeping only those the sheet accepts.
pub struct AttachItems {
    actor_repo: Arc<dyn ActorRepo>,
}

impl AttachItems {
    pub fn new(actor_repo: Arc<dyn ActorRepo>) -> Self {
        Self { actor_repo }
    }

    pub async fn execute(
        &self,
        actor_id: ActorId,
        items: Vec<Item>,
    ) -> Result<ItemAttachment, ActorSheetError> {
        let mut actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        let attachment = actor.attach_items(items);

        for rejected in &attachment.rejected {
            tracing::info!(
                actor_id = %actor_id,
                item = %rejected.name,
                reason = ?rejected.reason,
                "Item rejected"
            );
        }

        if !attachment.accepted.is_empty() {
            self.actor_repo.save(&actor).await?;
        }
        Ok(attachment)
    }
}

pub struct DetachItem {
    actor_repo: Arc<dyn ActorRepo>,
}

impl DetachItem {
    pub fn new(actor_repo: Arc<dyn ActorRepo>) -> Self {
        Self { actor_repo }
    }

    pub async fn execute(&self, actor_id: ActorId, item_id: ItemId) -> Result<Item, ActorSheetError> {
        let mut actor = load_actor(self.actor_repo.as_ref(), actor_id).await?;
        let item = actor.detach_item(item_id)?;
        self.actor_repo.save(&actor).await?;
        Ok(item)
    }
}

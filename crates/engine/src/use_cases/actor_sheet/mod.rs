//! Actor sheet use cases.
//!
//! Everything a player does to an existing character sheet: viewing derived
//! values, rolling, adjusting bars, attaching items, and editing table rows.

use std::sync::Arc;

use sheetforge_domain::{Actor, ActorId};

use crate::infrastructure::ports::ActorRepo;

mod adjust_bar;
mod error;
mod items;
mod prepare;
mod roll;
mod rows;

pub use adjust_bar::AdjustBar;
pub use error::ActorSheetError;
pub use items::{AttachItems, DetachItem};
pub use prepare::PrepareDerivedData;
pub use roll::{RollOutcome, RollProperty, RollRequest};
pub use rows::TableRows;

/// Container for actor sheet use cases.
pub struct ActorSheetUseCases {
    pub prepare: Arc<PrepareDerivedData>,
    pub roll: Arc<RollProperty>,
    pub adjust_bar: Arc<AdjustBar>,
    pub attach_items: Arc<AttachItems>,
    pub detach_item: Arc<DetachItem>,
    pub rows: Arc<TableRows>,
}

impl ActorSheetUseCases {
    pub fn new(
        prepare: Arc<PrepareDerivedData>,
        roll: Arc<RollProperty>,
        adjust_bar: Arc<AdjustBar>,
        attach_items: Arc<AttachItems>,
        detach_item: Arc<DetachItem>,
        rows: Arc<TableRows>,
    ) -> Self {
        Self {
            prepare,
            roll,
            adjust_bar,
            attach_items,
            detach_item,
            rows,
        }
    }
}

async fn load_actor(repo: &dyn ActorRepo, actor_id: ActorId) -> Result<Actor, ActorSheetError> {
    repo.get(actor_id)
        .await?
        .ok_or(ActorSheetError::ActorNotFound(actor_id))
}

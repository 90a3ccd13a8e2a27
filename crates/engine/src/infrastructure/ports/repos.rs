//! Repository port traits for actor storage.

use async_trait::async_trait;
use sheetforge_domain::{Actor, ActorId};

use super::error::RepoError;

// =============================================================================
// Actor Storage (characters and templates)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActorRepo: Send + Sync {
    async fn get(&self, id: ActorId) -> Result<Option<Actor>, RepoError>;
    async fn save(&self, actor: &Actor) -> Result<(), RepoError>;
    async fn delete(&self, id: ActorId) -> Result<(), RepoError>;

    async fn list(&self) -> Result<Vec<Actor>, RepoError>;
    /// Characters built from `template_id`.
    async fn list_by_template(&self, template_id: ActorId) -> Result<Vec<Actor>, RepoError>;
}

//! Actor sheet operation errors.

use crate::infrastructure::ports::{ChatError, RepoError};
use sheetforge_domain::{ActorId, DomainError, ResolveError, RollError};

/// Errors that can occur while working on a character sheet.
#[derive(Debug, thiserror::Error)]
pub enum ActorSheetError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Derived data failed: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Roll failed: {0}")]
    Roll(#[from] RollError),
    #[error("Validation error: {0}")]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),
}

//! Template operation errors.

use crate::infrastructure::ports::RepoError;
use sheetforge_domain::{ActorId, DomainError};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Template not found: {0}")]
    TemplateNotFound(ActorId),
    #[error("Actor {0} is not built from a template")]
    NoTemplate(ActorId),
    #[error("Validation error: {0}")]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific area of the sheet.
//! Use cases load actors through ports and delegate the rules to the domain.

pub mod actor_sheet;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;

pub use actor_sheet::{ActorSheetError, ActorSheetUseCases};
pub use template::{TemplateError, TemplateUseCases};

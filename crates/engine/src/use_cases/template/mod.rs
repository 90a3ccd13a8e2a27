//! Template use cases.

use std::sync::Arc;

mod columns;
mod error;
mod reload;

pub use columns::AddTableColumns;
pub use error::TemplateError;
pub use reload::{ActorReload, ReloadTemplate};

/// Container for template use cases.
pub struct TemplateUseCases {
    pub reload: Arc<ReloadTemplate>,
    pub add_columns: Arc<AddTableColumns>,
}

impl TemplateUseCases {
    pub fn new(reload: Arc<ReloadTemplate>, add_columns: Arc<AddTableColumns>) -> Self {
        Self {
            reload,
            add_columns,
        }
    }
}

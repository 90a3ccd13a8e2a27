//! SheetForge Engine library.
//!
//! Async application layer around the synchronous `sheetforge-domain` core.
//!
//! ## Structure
//!
//! - `use_cases/` - User story orchestration over actor storage
//! - `infrastructure/` - Port traits and their adapters
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;

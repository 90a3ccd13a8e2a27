//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Actor storage (JSON files, in-memory)
//! - Chat posting of roll results
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::ActorRepo;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{ChatMessage, ChatPort};

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{ChatError, RepoError};

#[cfg(test)]
pub use external::MockChatPort;
#[cfg(test)]
pub use repos::MockActorRepo;
#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

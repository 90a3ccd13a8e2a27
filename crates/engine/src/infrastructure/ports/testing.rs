//! Time and randomness behind ports so tests can pin them.

use chrono::{DateTime, Utc};

// =============================================================================
// Testability Ports
// =============================================================================

/// Timestamps posted roll messages.
#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of dice results.
#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform integer in `min..=max`.
    fn gen_range(&self, min: i32, max: i32) -> i32;
}

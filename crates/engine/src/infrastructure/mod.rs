//! Infrastructure - port traits and their adapters.

pub mod chat;
pub mod clock;
pub mod config;
pub mod json_store;
pub mod memory;
pub mod ports;

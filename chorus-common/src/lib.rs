//! # CHORUS Common Library
//!
//! Shared code for the CHORUS listening-session coordinator:
//! - Domain model (track records, votes, transport, snapshots)
//! - Event types (SessionEvent enum) and the EventBus broadcaster
//! - Common error types
//! - Configuration loading helpers

pub mod config;
pub mod error;
pub mod events;
pub mod model;

pub use error::{Error, Result};
pub use events::{EventBus, SessionEvent};

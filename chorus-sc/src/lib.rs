//! # CHORUS Session Coordinator Library (chorus-sc)
//!
//! Coordination engine for shared listening sessions: membership, the
//! vote-ranked queue, the track lifecycle state machine, and the
//! event-broadcast protocol that keeps every connected observer's view
//! consistent despite concurrent votes, joins, and transport changes.
//!
//! **Purpose:** the server is the sole source of truth for tallies and
//! ordering; clients apply received events only and never recompute
//! ranking from local mutations.

pub mod api;
pub mod authority;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;

pub use error::{Error, Result};
pub use gateway::SessionGateway;

//! Error types for chorus-sc
//!
//! All command failures here are local, synchronous results returned
//! to the single calling connection; none of them produce a broadcast.
//! A stale `advance` is deliberately *not* an error — it is a benign
//! no-op so retries stay idempotent.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the session coordinator
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Caller lacks authority for the command (host/delegate only)
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Command target is invalid for the session's current state
    /// (vote on a non-queued track, remove of a played track, unknown
    /// track or suggestion id)
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Unknown session id
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    /// External catalog lookup failed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using chorus-sc Error
pub type Result<T> = std::result::Result<T, Error>;

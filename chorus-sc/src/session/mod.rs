//! Session coordination engine
//!
//! **Responsibilities:**
//! - Per-session authoritative state (roster, tracks, votes, transport)
//! - Vote ledger and the deterministic ranking recompute
//! - Process-wide session registry with grace-period teardown
//!
//! Each session is the unit of serializability: mutations on one
//! session apply one at a time under its lock; different sessions
//! proceed fully in parallel.

pub mod ranking;
pub mod registry;
pub mod state;
pub mod votes;

pub use registry::{SessionHandle, SessionRegistry};
pub use state::{AdvanceOutcome, SessionState};
pub use votes::{Tally, VoteLedger};

//! Domain model for CHORUS listening sessions
//!
//! Value types shared between the session coordinator and its clients:
//! track records, vote directions, roster entries, transport state, and
//! the full-session snapshot sent on the join handshake.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a track within a session's queue
///
/// A track is created `queued`, becomes `current` at most once (by
/// advance or by auto-promotion after the current track is removed),
/// moves to `played` when superseded, and to `removed` on explicit
/// deletion. Removal is allowed from `queued` or `current`, never from
/// `played`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    Queued,
    Current,
    Played,
    Removed,
}

impl std::fmt::Display for TrackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackState::Queued => write!(f, "queued"),
            TrackState::Current => write!(f, "current"),
            TrackState::Played => write!(f, "played"),
            TrackState::Removed => write!(f, "removed"),
        }
    }
}

/// Direction of a member's vote on a track
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Like,
    Dislike,
}

impl std::fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteDirection::Like => write!(f, "like"),
            VoteDirection::Dislike => write!(f, "dislike"),
        }
    }
}

/// Role of a roster member within one session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Host,
    Participant,
}

/// One roster entry: a member and their role in the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub member_id: Uuid,
    pub role: MemberRole,
}

/// Track metadata resolved from the external music catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
    pub artwork_url: Option<String>,
}

/// One song instance placed into a session's queue
///
/// `likes`/`dislikes` are always derived from the vote ledger, never
/// independently incremented. `enqueued_seq` is assigned once at
/// creation and never reused; it is the stable tie-break for equal
/// vote scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Unique within the owning session
    pub id: Uuid,
    /// Opaque external-catalog reference
    pub source_ref: String,
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
    pub artwork_url: Option<String>,
    /// Member who added (or whose suggestion materialized) this track
    pub added_by: Uuid,
    /// Monotonic per-session enqueue sequence number
    pub enqueued_seq: u64,
    /// Live count of `like` ledger entries for this track
    pub likes: usize,
    /// Live count of `dislike` ledger entries for this track
    pub dislikes: usize,
    pub state: TrackState,
}

impl TrackRecord {
    /// Vote score: the primary ranking key
    pub fn score(&self) -> i64 {
        self.likes as i64 - self.dislikes as i64
    }
}

/// A proposed track awaiting host approval
///
/// Suggestions carry resolved catalog metadata but no vote ledger;
/// they are not rankable until approved into the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: Uuid,
    pub source_ref: String,
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
    pub artwork_url: Option<String>,
    pub proposed_by: Uuid,
}

/// Transport state synchronized across a session
///
/// Only play/pause and position *metadata* — no waveform alignment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transport {
    pub is_playing: bool,
    pub position_ms: u64,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            is_playing: false,
            position_ms: 0,
        }
    }
}

/// Full session snapshot sent to a joining connection
///
/// `tracks` is in ranked order: play history first (in the order tracks
/// became current), then queued tracks by vote score. Carries the
/// session `version` so the client can discard any event it later
/// receives with a non-increasing version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub version: u64,
    pub roster: Vec<RosterEntry>,
    pub tracks: Vec<TrackRecord>,
    pub current_track_id: Option<Uuid>,
    pub transport: Transport,
    pub suggestions: Vec<Suggestion>,
}

//! Event types for the CHORUS session event system
//!
//! Every applied mutation of a session emits exactly one typed event to
//! the full roster, including the originating member, so clients treat
//! server confirmation — not local optimistic state — as truth.
//!
//! Each event carries the session `version` at emission time. A client
//! that observes a non-increasing version relative to its last-applied
//! event discards the event as stale.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::{Suggestion, TrackRecord};

/// CHORUS session event types
///
/// Events are broadcast via EventBus and serialized for SSE
/// transmission with `type` as the discriminant field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A member entered the roster (or re-joined after a reconnect)
    MemberJoined {
        session_id: Uuid,
        version: u64,
        member_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A member left the roster
    MemberLeft {
        session_id: Uuid,
        version: u64,
        member_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track entered the queue (direct add or approved suggestion)
    TrackAdded {
        session_id: Uuid,
        version: u64,
        track: TrackRecord,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track was explicitly removed from the queue
    TrackRemoved {
        session_id: Uuid,
        version: u64,
        track_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A vote was applied; carries the full new tally, not a delta,
    /// so lost or duplicated deliveries self-correct
    VoteUpdated {
        session_id: Uuid,
        version: u64,
        track_id: Uuid,
        likes: usize,
        dislikes: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The current track changed; `None` means the queue ran out and
    /// the session returned to idle. Transport resets to paused at
    /// position 0 whenever the current track changes.
    NowPlaying {
        session_id: Uuid,
        version: u64,
        track_id: Option<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Transport metadata changed (play/pause/position only)
    PlaybackStateChanged {
        session_id: Uuid,
        version: u64,
        is_playing: bool,
        position_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A member proposed a track for host approval
    TrackSuggested {
        session_id: Uuid,
        version: u64,
        suggestion: Suggestion,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A pending suggestion was approved or rejected. Approval is
    /// followed by a separate TrackAdded event carrying the new track.
    SuggestionResolved {
        session_id: Uuid,
        version: u64,
        suggestion_id: Uuid,
        approved: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::MemberJoined { .. } => "MemberJoined",
            SessionEvent::MemberLeft { .. } => "MemberLeft",
            SessionEvent::TrackAdded { .. } => "TrackAdded",
            SessionEvent::TrackRemoved { .. } => "TrackRemoved",
            SessionEvent::VoteUpdated { .. } => "VoteUpdated",
            SessionEvent::NowPlaying { .. } => "NowPlaying",
            SessionEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            SessionEvent::TrackSuggested { .. } => "TrackSuggested",
            SessionEvent::SuggestionResolved { .. } => "SuggestionResolved",
        }
    }

    /// Session this event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            SessionEvent::MemberJoined { session_id, .. }
            | SessionEvent::MemberLeft { session_id, .. }
            | SessionEvent::TrackAdded { session_id, .. }
            | SessionEvent::TrackRemoved { session_id, .. }
            | SessionEvent::VoteUpdated { session_id, .. }
            | SessionEvent::NowPlaying { session_id, .. }
            | SessionEvent::PlaybackStateChanged { session_id, .. }
            | SessionEvent::TrackSuggested { session_id, .. }
            | SessionEvent::SuggestionResolved { session_id, .. } => *session_id,
        }
    }

    /// Session version at emission time (staleness detection key)
    pub fn version(&self) -> u64 {
        match self {
            SessionEvent::MemberJoined { version, .. }
            | SessionEvent::MemberLeft { version, .. }
            | SessionEvent::TrackAdded { version, .. }
            | SessionEvent::TrackRemoved { version, .. }
            | SessionEvent::VoteUpdated { version, .. }
            | SessionEvent::NowPlaying { version, .. }
            | SessionEvent::PlaybackStateChanged { version, .. }
            | SessionEvent::TrackSuggested { version, .. }
            | SessionEvent::SuggestionResolved { version, .. } => *version,
        }
    }
}

/// One-to-many event broadcaster over a tokio broadcast channel
///
/// Each session owns one EventBus; its subscribers are the SSE
/// connections of that session's roster. Delivery is lossy per
/// receiver (a lagged receiver drops the oldest buffered events);
/// reconnecting clients recover via the join-handshake snapshot.
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received; the join
    /// snapshot covers that gap.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber
    /// exists, `Err` otherwise.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// An empty session (everyone disconnected mid-grace-period) has
    /// no receivers, which is fine.
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

//! Vote ledger
//!
//! Per-(track, member) vote records. The unique key is
//! `(track_id, member_id)`: a new vote from the same member on the
//! same track replaces the prior entry rather than adding a second
//! one. This is the single idempotency guard against duplicate or
//! flip-flopping votes from unreliable network retries.
//!
//! Track-state checks (no votes on `current` or `played` tracks) live
//! in the session aggregate, which consults the ledger only for
//! `queued` targets.

use chorus_common::model::VoteDirection;
use std::collections::HashMap;
use uuid::Uuid;

/// Live like/dislike counts for one track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub likes: usize,
    pub dislikes: usize,
}

/// Vote records for one session, private to its session state
#[derive(Debug, Default)]
pub struct VoteLedger {
    entries: HashMap<(Uuid, Uuid), VoteDirection>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a member's vote on a track and return the new tally
    ///
    /// Overwrites any prior direction by the same member; resubmitting
    /// the same direction is a no-op on the counts.
    pub fn cast(&mut self, track_id: Uuid, member_id: Uuid, direction: VoteDirection) -> Tally {
        self.entries.insert((track_id, member_id), direction);
        self.tally(track_id)
    }

    /// Count of live entries per direction for a track
    pub fn tally(&self, track_id: Uuid) -> Tally {
        let mut tally = Tally {
            likes: 0,
            dislikes: 0,
        };
        for ((tid, _), direction) in &self.entries {
            if *tid == track_id {
                match direction {
                    VoteDirection::Like => tally.likes += 1,
                    VoteDirection::Dislike => tally.dislikes += 1,
                }
            }
        }
        tally
    }

    /// Discard all entries for a track (track removed from the session)
    pub fn discard_track(&mut self, track_id: Uuid) {
        self.entries.retain(|(tid, _), _| *tid != track_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

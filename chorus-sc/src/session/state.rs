//! Session state aggregate
//!
//! Authoritative in-memory state for one listening session: member
//! roster, track set, play history, pending suggestions, vote ledger,
//! current-track pointer, transport state, and the monotonic version
//! counter.
//!
//! Every mutation bumps `version` exactly once and returns the typed
//! event to broadcast, stamped with the post-mutation version. Callers
//! (the command gateway) apply mutations under the per-session lock
//! and emit the returned events while still holding it, so all
//! observers see events in application order.

use chorus_common::events::SessionEvent;
use chorus_common::model::{
    MemberRole, RosterEntry, SessionSnapshot, Suggestion, TrackMetadata, TrackRecord, TrackState,
    Transport,
};
use tracing::debug;
use uuid::Uuid;

use super::ranking;
use super::votes::{Tally, VoteLedger};
use crate::error::{Error, Result};

/// Outcome of an `advance` command
///
/// `Stale` means the caller's observed version predates an advance
/// that already applied; the command is a benign no-op, not an error,
/// so near-simultaneous retries from a host and a delegate cannot
/// double-advance.
#[derive(Debug)]
pub enum AdvanceOutcome {
    Applied(SessionEvent),
    Stale,
}

/// Authoritative state for one session
///
/// Owned exclusively by its session registry entry; the vote ledger
/// and track set are private to this aggregate and never shared
/// across sessions.
pub struct SessionState {
    session_id: Uuid,
    /// Roster in join order (join order decides host succession)
    roster: Vec<RosterEntry>,
    tracks: std::collections::HashMap<Uuid, TrackRecord>,
    /// Track ids in the order they became current; immutable except
    /// for stripping tracks that are removed outright
    history: Vec<Uuid>,
    suggestions: Vec<Suggestion>,
    ledger: VoteLedger,
    current_track_id: Option<Uuid>,
    transport: Transport,
    version: u64,
    next_seq: u64,
    /// Session version right after the last advance (or advance-like
    /// auto-promotion) applied; advances observing anything older are
    /// stale retries
    version_at_last_advance: u64,
}

impl SessionState {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            roster: Vec::new(),
            tracks: std::collections::HashMap::new(),
            history: Vec::new(),
            suggestions: Vec::new(),
            ledger: VoteLedger::new(),
            current_track_id: None,
            transport: Transport::default(),
            version: 0,
            next_seq: 1,
            version_at_last_advance: 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn current_track_id(&self) -> Option<Uuid> {
        self.current_track_id
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn is_member(&self, member_id: Uuid) -> bool {
        self.roster.iter().any(|m| m.member_id == member_id)
    }

    pub fn is_host(&self, member_id: Uuid) -> bool {
        self.roster
            .iter()
            .any(|m| m.member_id == member_id && m.role == MemberRole::Host)
    }

    pub fn roster_is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Look up a track by id (tests and diagnostics)
    pub fn track(&self, track_id: Uuid) -> Option<&TrackRecord> {
        self.tracks.get(&track_id)
    }

    fn bump(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    // ------------------------------------------------------------------
    // Roster
    // ------------------------------------------------------------------

    /// Add a member to the roster
    ///
    /// The first joiner becomes host. Re-joining is idempotent on the
    /// roster but still bumps the version and re-emits the event, so
    /// reconnect retries confirm like any other command.
    pub fn join(&mut self, member_id: Uuid) -> SessionEvent {
        if !self.is_member(member_id) {
            let role = if self.roster.is_empty() {
                MemberRole::Host
            } else {
                MemberRole::Participant
            };
            self.roster.push(RosterEntry { member_id, role });
            debug!(
                "Session {}: member {} joined as {:?}",
                self.session_id, member_id, role
            );
        }

        let version = self.bump();
        SessionEvent::MemberJoined {
            session_id: self.session_id,
            version,
            member_id,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Remove a member from the roster
    ///
    /// If the host leaves while others remain, the earliest remaining
    /// member inherits the host role so the session keeps a transport
    /// authority.
    pub fn leave(&mut self, member_id: Uuid) -> Result<SessionEvent> {
        let position = self
            .roster
            .iter()
            .position(|m| m.member_id == member_id)
            .ok_or_else(|| {
                Error::InvalidTarget(format!("member {} is not in the session", member_id))
            })?;

        let departed = self.roster.remove(position);
        if departed.role == MemberRole::Host {
            if let Some(successor) = self.roster.first_mut() {
                successor.role = MemberRole::Host;
                debug!(
                    "Session {}: host left, {} inherits host role",
                    self.session_id, successor.member_id
                );
            }
        }

        let version = self.bump();
        Ok(SessionEvent::MemberLeft {
            session_id: self.session_id,
            version,
            member_id,
            timestamp: chrono::Utc::now(),
        })
    }

    // ------------------------------------------------------------------
    // Queue mutations
    // ------------------------------------------------------------------

    /// Directly enqueue a track with resolved catalog metadata
    pub fn add_track(
        &mut self,
        added_by: Uuid,
        source_ref: String,
        meta: TrackMetadata,
    ) -> (TrackRecord, SessionEvent) {
        let track = self.materialize_track(added_by, source_ref, meta);
        let version = self.bump();
        let event = SessionEvent::TrackAdded {
            session_id: self.session_id,
            version,
            track: track.clone(),
            timestamp: chrono::Utc::now(),
        };
        (track, event)
    }

    fn materialize_track(
        &mut self,
        added_by: Uuid,
        source_ref: String,
        meta: TrackMetadata,
    ) -> TrackRecord {
        let seq = self.next_seq;
        self.next_seq += 1;

        let track = TrackRecord {
            id: Uuid::new_v4(),
            source_ref,
            title: meta.title,
            artist: meta.artist,
            duration_ms: meta.duration_ms,
            artwork_url: meta.artwork_url,
            added_by,
            enqueued_seq: seq,
            likes: 0,
            dislikes: 0,
            state: TrackState::Queued,
        };
        self.tracks.insert(track.id, track.clone());
        track
    }

    /// Hold a proposed track in the pending set for host review
    pub fn propose(
        &mut self,
        proposed_by: Uuid,
        source_ref: String,
        meta: TrackMetadata,
    ) -> (Suggestion, SessionEvent) {
        let suggestion = Suggestion {
            id: Uuid::new_v4(),
            source_ref,
            title: meta.title,
            artist: meta.artist,
            duration_ms: meta.duration_ms,
            artwork_url: meta.artwork_url,
            proposed_by,
        };
        self.suggestions.push(suggestion.clone());

        let version = self.bump();
        let event = SessionEvent::TrackSuggested {
            session_id: self.session_id,
            version,
            suggestion: suggestion.clone(),
            timestamp: chrono::Utc::now(),
        };
        (suggestion, event)
    }

    /// Approve or reject a pending suggestion
    ///
    /// Approval materializes the suggestion into the queue and yields
    /// two versioned events (SuggestionResolved, then TrackAdded);
    /// rejection discards it with a single event.
    pub fn resolve_suggestion(
        &mut self,
        suggestion_id: Uuid,
        approve: bool,
    ) -> Result<Vec<SessionEvent>> {
        let position = self
            .suggestions
            .iter()
            .position(|s| s.id == suggestion_id)
            .ok_or_else(|| {
                Error::InvalidTarget(format!("no pending suggestion {}", suggestion_id))
            })?;

        let suggestion = self.suggestions.remove(position);
        let version = self.bump();
        let mut events = vec![SessionEvent::SuggestionResolved {
            session_id: self.session_id,
            version,
            suggestion_id,
            approved: approve,
            timestamp: chrono::Utc::now(),
        }];

        if approve {
            let meta = TrackMetadata {
                title: suggestion.title,
                artist: suggestion.artist,
                duration_ms: suggestion.duration_ms,
                artwork_url: suggestion.artwork_url,
            };
            let track =
                self.materialize_track(suggestion.proposed_by, suggestion.source_ref, meta);
            let version = self.bump();
            events.push(SessionEvent::TrackAdded {
                session_id: self.session_id,
                version,
                track,
                timestamp: chrono::Utc::now(),
            });
        }

        Ok(events)
    }

    /// Remove a track from the session
    ///
    /// Allowed from `queued` or `current`, never from `played`.
    /// Removing the current track discards it outright (no `played`
    /// transition) and auto-promotes the next ranked queued track,
    /// so the second event is the resulting NowPlaying.
    pub fn remove_track(&mut self, track_id: Uuid) -> Result<Vec<SessionEvent>> {
        let state = self
            .tracks
            .get(&track_id)
            .map(|t| t.state)
            .ok_or_else(|| Error::InvalidTarget(format!("unknown track {}", track_id)))?;

        match state {
            TrackState::Played => {
                return Err(Error::InvalidTarget(format!(
                    "track {} has already played",
                    track_id
                )));
            }
            TrackState::Removed => {
                return Err(Error::InvalidTarget(format!(
                    "track {} was already removed",
                    track_id
                )));
            }
            TrackState::Queued | TrackState::Current => {}
        }

        let was_current = state == TrackState::Current;
        if let Some(track) = self.tracks.get_mut(&track_id) {
            track.state = TrackState::Removed;
        }
        self.ledger.discard_track(track_id);
        self.history.retain(|id| *id != track_id);

        let version = self.bump();
        let mut events = vec![SessionEvent::TrackRemoved {
            session_id: self.session_id,
            version,
            track_id,
            timestamp: chrono::Utc::now(),
        }];

        if was_current {
            self.current_track_id = None;
            events.push(self.promote_next());
            // Promotion counts as an advance for retry detection, so a
            // delegate's racing advance cannot skip the promoted track
            self.version_at_last_advance = self.version;
        }

        Ok(events)
    }

    /// Upsert a member's vote and return the recomputed tally
    ///
    /// Fails with InvalidTarget unless the track is `queued`; the
    /// current and played tracks are not votable, which is what keeps
    /// "upcoming" well-defined.
    pub fn cast_vote(
        &mut self,
        member_id: Uuid,
        track_id: Uuid,
        direction: chorus_common::model::VoteDirection,
    ) -> Result<(Tally, SessionEvent)> {
        let state = self
            .tracks
            .get(&track_id)
            .map(|t| t.state)
            .ok_or_else(|| Error::InvalidTarget(format!("unknown track {}", track_id)))?;

        if state != TrackState::Queued {
            return Err(Error::InvalidTarget(format!(
                "track {} is {}, only queued tracks are votable",
                track_id, state
            )));
        }

        let tally = self.ledger.cast(track_id, member_id, direction);
        if let Some(track) = self.tracks.get_mut(&track_id) {
            track.likes = tally.likes;
            track.dislikes = tally.dislikes;
        }

        let version = self.bump();
        let event = SessionEvent::VoteUpdated {
            session_id: self.session_id,
            version,
            track_id,
            likes: tally.likes,
            dislikes: tally.dislikes,
            timestamp: chrono::Utc::now(),
        };
        Ok((tally, event))
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Mark the current track played and promote the next ranked track
    ///
    /// Idempotent under retransmission: `observed_version` older than
    /// the last applied advance means another advance already handled
    /// it, and the call becomes a no-op returning the current state.
    pub fn advance(&mut self, observed_version: u64) -> AdvanceOutcome {
        if observed_version < self.version_at_last_advance {
            debug!(
                "Session {}: advance observed version {} predates last advance at {}, no-op",
                self.session_id, observed_version, self.version_at_last_advance
            );
            return AdvanceOutcome::Stale;
        }

        if let Some(current_id) = self.current_track_id.take() {
            if let Some(track) = self.tracks.get_mut(&current_id) {
                track.state = TrackState::Played;
            }
        }

        let event = self.promote_next();
        self.version_at_last_advance = self.version;
        AdvanceOutcome::Applied(event)
    }

    /// Promote the top ranked `queued` track to `current`
    ///
    /// Transport always resets to paused at position 0. With an empty
    /// queue the session returns to idle with no current track.
    fn promote_next(&mut self) -> SessionEvent {
        let next = ranking::ranked_queue(&self.tracks).into_iter().next();

        if let Some(track_id) = next {
            if let Some(track) = self.tracks.get_mut(&track_id) {
                track.state = TrackState::Current;
            }
            self.history.push(track_id);
            self.current_track_id = Some(track_id);
        } else {
            self.current_track_id = None;
        }
        self.transport = Transport::default();

        let version = self.bump();
        SessionEvent::NowPlaying {
            session_id: self.session_id,
            version,
            track_id: self.current_track_id,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Update transport metadata only (play/pause/position)
    pub fn set_playback(&mut self, is_playing: bool, position_ms: u64) -> Result<SessionEvent> {
        if self.current_track_id.is_none() {
            return Err(Error::InvalidTarget(
                "no current track to control".to_string(),
            ));
        }

        self.transport = Transport {
            is_playing,
            position_ms,
        };

        let version = self.bump();
        Ok(SessionEvent::PlaybackStateChanged {
            session_id: self.session_id,
            version,
            is_playing,
            position_ms,
            timestamp: chrono::Utc::now(),
        })
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    /// Full snapshot for the join handshake and reconnect resync
    ///
    /// Track order is the authoritative ranking: play history first,
    /// then queued tracks by vote score. Removed tracks are excluded.
    pub fn snapshot(&self) -> SessionSnapshot {
        let tracks = ranking::ranked_order(&self.history, &self.tracks)
            .into_iter()
            .filter_map(|id| self.tracks.get(&id).cloned())
            .collect();

        SessionSnapshot {
            session_id: self.session_id,
            version: self.version,
            roster: self.roster.clone(),
            tracks,
            current_track_id: self.current_track_id,
            transport: self.transport,
            suggestions: self.suggestions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_common::model::VoteDirection;

    fn meta(title: &str) -> TrackMetadata {
        TrackMetadata {
            title: title.to_string(),
            artist: "Tester".to_string(),
            duration_ms: 200_000,
            artwork_url: None,
        }
    }

    fn session_with_members(count: usize) -> (SessionState, Vec<Uuid>) {
        let mut state = SessionState::new(Uuid::new_v4());
        let members: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
        for m in &members {
            state.join(*m);
        }
        (state, members)
    }

    #[test]
    fn test_first_joiner_is_host() {
        let (state, members) = session_with_members(3);
        assert!(state.is_host(members[0]));
        assert!(!state.is_host(members[1]));
        assert!(state.is_member(members[2]));
    }

    #[test]
    fn test_every_mutation_bumps_version_once() {
        let mut state = SessionState::new(Uuid::new_v4());
        let member = Uuid::new_v4();

        let event = state.join(member);
        assert_eq!(event.version(), 1);
        assert_eq!(state.version(), 1);

        let (_, event) = state.add_track(member, "cat:1".to_string(), meta("A"));
        assert_eq!(event.version(), 2);
        assert_eq!(state.version(), 2);
    }

    #[test]
    fn test_host_role_passes_to_earliest_remaining_member() {
        let (mut state, members) = session_with_members(3);
        state.leave(members[0]).unwrap();
        assert!(state.is_host(members[1]));
        assert!(!state.is_host(members[2]));
    }

    #[test]
    fn test_leave_unknown_member_is_invalid_target() {
        let (mut state, _) = session_with_members(1);
        let result = state.leave(Uuid::new_v4());
        assert!(matches!(result, Err(Error::InvalidTarget(_))));
    }

    #[test]
    fn test_rejoin_does_not_duplicate_roster_entry() {
        let (mut state, members) = session_with_members(2);
        state.join(members[1]);
        assert_eq!(state.snapshot().roster.len(), 2);
    }

    #[test]
    fn test_enqueued_seq_is_monotonic_and_never_reused() {
        let (mut state, members) = session_with_members(1);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));
        let (b, _) = state.add_track(members[0], "cat:b".to_string(), meta("B"));
        state.remove_track(a.id).unwrap();
        let (c, _) = state.add_track(members[0], "cat:c".to_string(), meta("C"));

        assert_eq!(a.enqueued_seq, 1);
        assert_eq!(b.enqueued_seq, 2);
        assert_eq!(c.enqueued_seq, 3);
    }

    #[test]
    fn test_vote_on_queued_track_updates_tally() {
        let (mut state, members) = session_with_members(2);
        let (track, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));

        let (tally, event) = state
            .cast_vote(members[1], track.id, VoteDirection::Like)
            .unwrap();
        assert_eq!(tally.likes, 1);
        assert_eq!(tally.dislikes, 0);
        assert_eq!(event.event_type(), "VoteUpdated");

        // Record carries the live derived counts
        assert_eq!(state.track(track.id).unwrap().likes, 1);
    }

    #[test]
    fn test_vote_on_current_or_played_track_is_rejected() {
        let (mut state, members) = session_with_members(2);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));
        let (b, _) = state.add_track(members[0], "cat:b".to_string(), meta("B"));

        // Promote A to current
        state.advance(state.version());
        assert_eq!(state.current_track_id(), Some(a.id));
        assert!(matches!(
            state.cast_vote(members[1], a.id, VoteDirection::Like),
            Err(Error::InvalidTarget(_))
        ));

        // Advance again: A is played, B current
        state.advance(state.version());
        assert_eq!(state.track(a.id).unwrap().state, TrackState::Played);
        assert!(matches!(
            state.cast_vote(members[1], a.id, VoteDirection::Dislike),
            Err(Error::InvalidTarget(_))
        ));
        assert!(matches!(
            state.cast_vote(members[1], b.id, VoteDirection::Like),
            Err(Error::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_advance_promotes_highest_ranked_and_resets_transport() {
        let (mut state, members) = session_with_members(2);
        let (_a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));
        let (b, _) = state.add_track(members[0], "cat:b".to_string(), meta("B"));
        state
            .cast_vote(members[1], b.id, VoteDirection::Like)
            .unwrap();

        state.set_playback(true, 1000).err().unwrap(); // no current yet

        match state.advance(state.version()) {
            AdvanceOutcome::Applied(SessionEvent::NowPlaying { track_id, .. }) => {
                assert_eq!(track_id, Some(b.id));
            }
            other => panic!("Expected applied NowPlaying, got {:?}", other),
        }
        assert_eq!(state.current_track_id(), Some(b.id));
        assert_eq!(state.transport(), Transport::default());
    }

    #[test]
    fn test_double_advance_with_same_observed_version_is_noop() {
        let (mut state, members) = session_with_members(1);
        state.add_track(members[0], "cat:a".to_string(), meta("A"));
        state.add_track(members[0], "cat:b".to_string(), meta("B"));

        let observed = state.version();
        assert!(matches!(
            state.advance(observed),
            AdvanceOutcome::Applied(_)
        ));
        let version_after_first = state.version();
        let current_after_first = state.current_track_id();

        // Retransmitted command with the consumed observed version
        assert!(matches!(state.advance(observed), AdvanceOutcome::Stale));
        assert_eq!(state.version(), version_after_first);
        assert_eq!(state.current_track_id(), current_after_first);
    }

    #[test]
    fn test_vote_between_observation_and_advance_does_not_block_it() {
        let (mut state, members) = session_with_members(2);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));

        let observed = state.version();
        state
            .cast_vote(members[1], a.id, VoteDirection::Like)
            .unwrap();

        // Only a competing advance makes an observed version stale
        assert!(matches!(
            state.advance(observed),
            AdvanceOutcome::Applied(_)
        ));
    }

    #[test]
    fn test_advance_with_empty_queue_returns_to_idle() {
        let (mut state, members) = session_with_members(1);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));

        state.advance(state.version());
        assert_eq!(state.current_track_id(), Some(a.id));

        match state.advance(state.version()) {
            AdvanceOutcome::Applied(SessionEvent::NowPlaying { track_id, .. }) => {
                assert_eq!(track_id, None);
            }
            other => panic!("Expected applied NowPlaying, got {:?}", other),
        }
        assert_eq!(state.current_track_id(), None);
        assert_eq!(state.track(a.id).unwrap().state, TrackState::Played);
    }

    #[test]
    fn test_remove_queued_track_discards_votes() {
        let (mut state, members) = session_with_members(2);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));
        state
            .cast_vote(members[1], a.id, VoteDirection::Like)
            .unwrap();

        let events = state.remove_track(a.id).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "TrackRemoved");
        assert_eq!(state.track(a.id).unwrap().state, TrackState::Removed);

        // Removed tracks vanish from the snapshot
        assert!(state.snapshot().tracks.is_empty());
    }

    #[test]
    fn test_remove_current_track_auto_promotes_next() {
        let (mut state, members) = session_with_members(2);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));
        let (b, _) = state.add_track(members[0], "cat:b".to_string(), meta("B"));

        state.advance(state.version());
        assert_eq!(state.current_track_id(), Some(a.id));

        let events = state.remove_track(a.id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "TrackRemoved");
        match &events[1] {
            SessionEvent::NowPlaying { track_id, .. } => assert_eq!(*track_id, Some(b.id)),
            other => panic!("Expected NowPlaying, got {:?}", other),
        }

        // Removed, not played: the played transition is skipped
        assert_eq!(state.track(a.id).unwrap().state, TrackState::Removed);
        assert_eq!(state.current_track_id(), Some(b.id));
        // The discarded track leaves no trace in the visible ordering
        assert_eq!(
            state.snapshot().tracks.first().map(|t| t.id),
            Some(b.id)
        );
    }

    #[test]
    fn test_remove_played_track_is_rejected() {
        let (mut state, members) = session_with_members(1);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));
        state.advance(state.version());
        state.advance(state.version());
        assert_eq!(state.track(a.id).unwrap().state, TrackState::Played);

        assert!(matches!(
            state.remove_track(a.id),
            Err(Error::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_set_playback_updates_transport_only() {
        let (mut state, members) = session_with_members(1);
        state.add_track(members[0], "cat:a".to_string(), meta("A"));
        state.advance(state.version());

        let current = state.current_track_id();
        let event = state.set_playback(true, 42_000).unwrap();
        assert_eq!(event.event_type(), "PlaybackStateChanged");
        assert_eq!(state.transport().is_playing, true);
        assert_eq!(state.transport().position_ms, 42_000);
        assert_eq!(state.current_track_id(), current);
    }

    #[test]
    fn test_suggestion_approve_materializes_queued_track() {
        let (mut state, members) = session_with_members(2);
        let (suggestion, event) =
            state.propose(members[1], "cat:s".to_string(), meta("Suggested"));
        assert_eq!(event.event_type(), "TrackSuggested");
        assert_eq!(state.snapshot().suggestions.len(), 1);

        let events = state.resolve_suggestion(suggestion.id, true).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type(), "SuggestionResolved");
        match &events[1] {
            SessionEvent::TrackAdded { track, .. } => {
                assert_eq!(track.state, TrackState::Queued);
                assert_eq!(track.added_by, members[1]);
                assert_eq!(track.title, "Suggested");
            }
            other => panic!("Expected TrackAdded, got {:?}", other),
        }
        assert!(state.snapshot().suggestions.is_empty());
    }

    #[test]
    fn test_suggestion_reject_discards() {
        let (mut state, members) = session_with_members(2);
        let (suggestion, _) = state.propose(members[1], "cat:s".to_string(), meta("Suggested"));

        let events = state.resolve_suggestion(suggestion.id, false).unwrap();
        assert_eq!(events.len(), 1);
        assert!(state.snapshot().suggestions.is_empty());
        assert!(state.snapshot().tracks.is_empty());

        // Resolving twice is an invalid target
        assert!(matches!(
            state.resolve_suggestion(suggestion.id, false),
            Err(Error::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_snapshot_order_matches_incremental_observation() {
        // A member who joins late must see the same ranked order a
        // present-from-the-start member would compute from events
        let (mut state, members) = session_with_members(3);
        let (a, _) = state.add_track(members[0], "cat:a".to_string(), meta("A"));
        let (_b, _) = state.add_track(members[0], "cat:b".to_string(), meta("B"));
        let (c, _) = state.add_track(members[0], "cat:c".to_string(), meta("C"));

        state
            .cast_vote(members[1], c.id, VoteDirection::Like)
            .unwrap();
        state
            .cast_vote(members[2], a.id, VoteDirection::Like)
            .unwrap();

        // Tie between A and C at score 1: A wins on earlier seq
        let snapshot = state.snapshot();
        let titles: Vec<&str> = snapshot.tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C", "B"]);

        let late_joiner = Uuid::new_v4();
        state.join(late_joiner);
        let late_snapshot = state.snapshot();
        let late_titles: Vec<&str> = late_snapshot
            .tracks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(late_titles, titles);
        assert_eq!(late_snapshot.tracks[0].likes, 1);
    }
}

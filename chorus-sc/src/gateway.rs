//! Command gateway
//!
//! Single entry point for member actions. Each command validates
//! authority and session invariants, applies the mutation to session
//! state under the per-session lock, and emits the resulting typed
//! event(s) to the session's broadcast channel *while still holding
//! the lock*, so every subscriber observes events in the exact order
//! mutations were applied. Commands on different sessions share no
//! locks and run fully in parallel.
//!
//! Authority rules: propose and vote are open to any roster member;
//! approve/reject, advance, set-playback, and remove-track require
//! the host or an explicitly delegated controller.

use chorus_common::events::SessionEvent;
use chorus_common::model::{SessionSnapshot, Suggestion, TrackRecord, VoteDirection};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::authority::DelegationTable;
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::session::state::{AdvanceOutcome, SessionState};
use crate::session::{SessionHandle, SessionRegistry, Tally};

/// Gateway wiring: the session table, the catalog seam, and the
/// delegation table
pub struct SessionGateway {
    registry: Arc<SessionRegistry>,
    catalog: Catalog,
    delegation: DelegationTable,
}

impl SessionGateway {
    pub fn new(registry: Arc<SessionRegistry>, catalog: Catalog) -> Self {
        Self {
            registry,
            catalog,
            delegation: DelegationTable::new(),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn delegation(&self) -> &DelegationTable {
        &self.delegation
    }

    fn require_member(state: &SessionState, member_id: Uuid) -> Result<()> {
        if state.is_member(member_id) {
            Ok(())
        } else {
            Err(Error::NotAuthorized(format!(
                "member {} is not in session {}",
                member_id,
                state.session_id()
            )))
        }
    }

    fn require_controller(&self, state: &SessionState, member_id: Uuid) -> Result<()> {
        Self::require_member(state, member_id)?;
        if state.is_host(member_id) || self.delegation.is_delegate(state.session_id(), member_id) {
            Ok(())
        } else {
            Err(Error::NotAuthorized(format!(
                "member {} is neither host nor delegate of session {}",
                member_id,
                state.session_id()
            )))
        }
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Join a session, creating it on first join
    ///
    /// Returns the full snapshot for the joining connection only —
    /// this is what makes late joins and reconnects safe without
    /// delta replay.
    pub async fn join(&self, session_id: Uuid, member_id: Uuid) -> Result<SessionSnapshot> {
        let handle = self.registry.get_or_create(session_id).await;
        let mut state = handle.state.lock().await;
        let event = state.join(member_id);
        handle.events.emit_lossy(event);
        info!("Member {} joined session {}", member_id, session_id);
        Ok(state.snapshot())
    }

    /// Leave a session; an emptied roster starts the teardown timer
    pub async fn leave(&self, session_id: Uuid, member_id: Uuid) -> Result<()> {
        let handle = self.registry.get(session_id).await?;
        let roster_empty = {
            let mut state = handle.state.lock().await;
            let event = state.leave(member_id)?;
            handle.events.emit_lossy(event);
            state.roster_is_empty()
        };

        info!("Member {} left session {}", member_id, session_id);
        if roster_empty {
            self.registry.schedule_teardown(handle);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queue commands
    // ------------------------------------------------------------------

    /// Directly enqueue a track (any member)
    ///
    /// The catalog lookup runs before the session lock is taken;
    /// network I/O never blocks other mutations of the session.
    pub async fn add_track(
        &self,
        session_id: Uuid,
        member_id: Uuid,
        source_ref: String,
    ) -> Result<TrackRecord> {
        let meta = self.catalog.resolve(&source_ref).await?;

        let handle = self.registry.get(session_id).await?;
        let mut state = handle.state.lock().await;
        Self::require_member(&state, member_id)?;

        let (track, event) = state.add_track(member_id, source_ref, meta);
        handle.events.emit_lossy(event);
        info!(
            "Track {} ({}) enqueued in session {} by {}",
            track.id, track.title, session_id, member_id
        );
        Ok(track)
    }

    /// Propose a track for host approval (any member)
    pub async fn propose(
        &self,
        session_id: Uuid,
        member_id: Uuid,
        source_ref: String,
    ) -> Result<Suggestion> {
        let meta = self.catalog.resolve(&source_ref).await?;

        let handle = self.registry.get(session_id).await?;
        let mut state = handle.state.lock().await;
        Self::require_member(&state, member_id)?;

        let (suggestion, event) = state.propose(member_id, source_ref, meta);
        handle.events.emit_lossy(event);
        info!(
            "Suggestion {} proposed in session {} by {}",
            suggestion.id, session_id, member_id
        );
        Ok(suggestion)
    }

    /// Approve or reject a pending suggestion (host/delegate)
    pub async fn resolve_suggestion(
        &self,
        session_id: Uuid,
        member_id: Uuid,
        suggestion_id: Uuid,
        approve: bool,
    ) -> Result<()> {
        let handle = self.registry.get(session_id).await?;
        let mut state = handle.state.lock().await;
        self.require_controller(&state, member_id)?;

        for event in state.resolve_suggestion(suggestion_id, approve)? {
            handle.events.emit_lossy(event);
        }
        info!(
            "Suggestion {} {} in session {} by {}",
            suggestion_id,
            if approve { "approved" } else { "rejected" },
            session_id,
            member_id
        );
        Ok(())
    }

    /// Remove a track (host/delegate); fails on played tracks
    pub async fn remove_track(
        &self,
        session_id: Uuid,
        member_id: Uuid,
        track_id: Uuid,
    ) -> Result<()> {
        let handle = self.registry.get(session_id).await?;
        let mut state = handle.state.lock().await;
        self.require_controller(&state, member_id)?;

        for event in state.remove_track(track_id)? {
            handle.events.emit_lossy(event);
        }
        info!(
            "Track {} removed from session {} by {}",
            track_id, session_id, member_id
        );
        Ok(())
    }

    /// Cast or change a vote (any member); returns the new tally
    pub async fn vote(
        &self,
        session_id: Uuid,
        member_id: Uuid,
        track_id: Uuid,
        direction: VoteDirection,
    ) -> Result<Tally> {
        let handle = self.registry.get(session_id).await?;
        let mut state = handle.state.lock().await;
        Self::require_member(&state, member_id)?;

        let (tally, event) = state.cast_vote(member_id, track_id, direction)?;
        handle.events.emit_lossy(event);
        Ok(tally)
    }

    // ------------------------------------------------------------------
    // Transport commands
    // ------------------------------------------------------------------

    /// Advance to the next ranked track (host/delegate)
    ///
    /// A stale `observed_version` makes the call a no-op; either way
    /// the caller gets the session state after the advance that did
    /// apply, so retries converge instead of double-advancing.
    pub async fn advance(
        &self,
        session_id: Uuid,
        member_id: Uuid,
        observed_version: u64,
    ) -> Result<SessionSnapshot> {
        let handle = self.registry.get(session_id).await?;
        let mut state = handle.state.lock().await;
        self.require_controller(&state, member_id)?;

        match state.advance(observed_version) {
            AdvanceOutcome::Applied(event) => {
                handle.events.emit_lossy(event);
                info!(
                    "Session {} advanced to {:?} by {}",
                    session_id,
                    state.current_track_id(),
                    member_id
                );
            }
            AdvanceOutcome::Stale => {
                info!(
                    "Session {} advance from {} was stale (observed version {}), no-op",
                    session_id, member_id, observed_version
                );
            }
        }
        Ok(state.snapshot())
    }

    /// Update transport metadata (host/delegate)
    pub async fn set_playback(
        &self,
        session_id: Uuid,
        member_id: Uuid,
        is_playing: bool,
        position_ms: u64,
    ) -> Result<()> {
        let handle = self.registry.get(session_id).await?;
        let mut state = handle.state.lock().await;
        self.require_controller(&state, member_id)?;

        let event = state.set_playback(is_playing, position_ms)?;
        handle.events.emit_lossy(event);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Read-only snapshot of a session
    ///
    /// Taken under the session lock, so it always reflects a prefix
    /// of applied writes, never a torn state.
    pub async fn snapshot(&self, session_id: Uuid) -> Result<SessionSnapshot> {
        let handle = self.registry.get(session_id).await?;
        let state = handle.state.lock().await;
        Ok(state.snapshot())
    }

    /// Subscribe to a session's broadcast channel
    pub async fn subscribe(
        &self,
        session_id: Uuid,
    ) -> Result<broadcast::Receiver<SessionEvent>> {
        let handle = self.registry.get(session_id).await?;
        Ok(handle.events.subscribe())
    }

    /// Handle accessor for tests that need direct state access
    pub async fn session(&self, session_id: Uuid) -> Result<Arc<SessionHandle>> {
        self.registry.get(session_id).await
    }
}

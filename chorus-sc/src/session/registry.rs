//! Session registry
//!
//! Process-wide table mapping session id to live session state.
//! Sessions are created on first join and torn down after the roster
//! has been empty continuously for a grace period — long enough to
//! cover brief reconnects, not abandonment. Any join before the timer
//! fires cancels the teardown.

use chorus_common::events::EventBus;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::state::SessionState;
use crate::error::{Error, Result};

/// One live session: its state under the per-session lock, and its
/// broadcast channel
///
/// The mutex is the single-writer-per-session discipline: "check
/// invariant, then apply mutation" never interleaves with another
/// mutation of the same session. Ranking recomputes and state
/// transitions are synchronous and bounded, so holding the lock
/// across them cannot stall other sessions.
pub struct SessionHandle {
    pub state: Mutex<SessionState>,
    pub events: EventBus,
    /// Bumped on every join; a pending teardown timer holding an older
    /// value knows the session was revived and stands down
    teardown_generation: AtomicU64,
}

impl SessionHandle {
    fn new(session_id: Uuid, event_capacity: usize) -> Self {
        Self {
            state: Mutex::new(SessionState::new(session_id)),
            events: EventBus::new(event_capacity),
            teardown_generation: AtomicU64::new(0),
        }
    }

    /// Cancel any pending teardown (called on join)
    pub fn cancel_teardown(&self) {
        self.teardown_generation.fetch_add(1, Ordering::SeqCst);
    }

    fn teardown_generation(&self) -> u64 {
        self.teardown_generation.load(Ordering::SeqCst)
    }
}

/// Process-wide session table
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<SessionHandle>>>,
    teardown_grace: Duration,
    event_capacity: usize,
}

impl SessionRegistry {
    pub fn new(teardown_grace: Duration, event_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            teardown_grace,
            event_capacity,
        }
    }

    /// Look up a live session, creating it if this is the first join
    pub async fn get_or_create(&self, session_id: Uuid) -> Arc<SessionHandle> {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(&session_id) {
                handle.cancel_teardown();
                return Arc::clone(handle);
            }
        }

        let mut sessions = self.sessions.write().await;
        // Racing joiner may have created it between the locks
        let handle = sessions.entry(session_id).or_insert_with(|| {
            info!("Creating session {}", session_id);
            Arc::new(SessionHandle::new(session_id, self.event_capacity))
        });
        handle.cancel_teardown();
        Arc::clone(handle)
    }

    /// Look up a live session
    pub async fn get(&self, session_id: Uuid) -> Result<Arc<SessionHandle>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .cloned()
            .ok_or(Error::SessionNotFound(session_id))
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Start the teardown grace timer for a session whose roster just
    /// emptied
    ///
    /// The timer captures the handle's current teardown generation; a
    /// join before expiry bumps the generation and the fired timer
    /// stands down. The timer is not renewable once fired: if the
    /// roster is still empty at expiry, the session is dropped and the
    /// next join rebuilds it from scratch.
    pub fn schedule_teardown(self: &Arc<Self>, handle: Arc<SessionHandle>) {
        let registry = Arc::clone(self);
        let generation = handle.teardown_generation();
        let grace = self.teardown_grace;

        tokio::spawn(async move {
            tokio::time::sleep(grace).await;

            if handle.teardown_generation() != generation {
                debug!("Teardown cancelled by a re-join");
                return;
            }

            let session_id = {
                let state = handle.state.lock().await;
                if !state.roster_is_empty() {
                    return;
                }
                state.session_id()
            };

            let mut sessions = registry.sessions.write().await;
            // Re-check under the write lock: a join may have raced the
            // roster check above
            if handle.teardown_generation() == generation {
                sessions.remove(&session_id);
                info!("Session {} torn down after empty-roster grace period", session_id);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(grace_ms: u64) -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(
            Duration::from_millis(grace_ms),
            16,
        ))
    }

    #[tokio::test]
    async fn test_get_or_create_creates_once() {
        let registry = registry(1000);
        let session_id = Uuid::new_v4();

        let first = registry.get_or_create(session_id).await;
        let second = registry.get_or_create(session_id).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_session_fails() {
        let registry = registry(1000);
        let result = registry.get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::SessionNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_after_grace_period() {
        let registry = registry(5000);
        let session_id = Uuid::new_v4();
        let member = Uuid::new_v4();

        let handle = registry.get_or_create(session_id).await;
        {
            let mut state = handle.state.lock().await;
            state.join(member);
            state.leave(member).unwrap();
            assert!(state.roster_is_empty());
        }
        registry.schedule_teardown(Arc::clone(&handle));

        // Still alive inside the grace window
        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(registry.len().await, 1);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejoin_cancels_teardown() {
        let registry = registry(5000);
        let session_id = Uuid::new_v4();
        let member = Uuid::new_v4();

        let handle = registry.get_or_create(session_id).await;
        {
            let mut state = handle.state.lock().await;
            state.join(member);
            state.leave(member).unwrap();
        }
        registry.schedule_teardown(Arc::clone(&handle));

        tokio::time::sleep(Duration::from_millis(3000)).await;
        let rejoined = registry.get_or_create(session_id).await;
        {
            let mut state = rejoined.state.lock().await;
            state.join(member);
        }

        // Past the original deadline: the session survived
        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(registry.len().await, 1);
        assert!(Arc::ptr_eq(&handle, &rejoined));
    }
}

//! Transport-authority delegation
//!
//! The host can extend transport authority (advance, play/pause,
//! remove) to another member. The grant workflow itself lives outside
//! this core; what the command gateway consumes is this narrow
//! interface: is this member a delegated controller for this session?

use std::collections::HashSet;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// In-memory delegation grants, keyed by (session, member)
#[derive(Default)]
pub struct DelegationTable {
    grants: RwLock<HashSet<(Uuid, Uuid)>>,
}

impl DelegationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, session_id: Uuid, member_id: Uuid) {
        let mut grants = self.grants.write().expect("delegation lock poisoned");
        if grants.insert((session_id, member_id)) {
            info!(
                "Delegated transport authority in session {} to {}",
                session_id, member_id
            );
        }
    }

    pub fn revoke(&self, session_id: Uuid, member_id: Uuid) {
        let mut grants = self.grants.write().expect("delegation lock poisoned");
        if grants.remove(&(session_id, member_id)) {
            info!(
                "Revoked transport authority in session {} from {}",
                session_id, member_id
            );
        }
    }

    pub fn is_delegate(&self, session_id: Uuid, member_id: Uuid) -> bool {
        self.grants
            .read()
            .expect("delegation lock poisoned")
            .contains(&(session_id, member_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let table = DelegationTable::new();
        let session = Uuid::new_v4();
        let member = Uuid::new_v4();

        assert!(!table.is_delegate(session, member));

        table.grant(session, member);
        assert!(table.is_delegate(session, member));

        // Grants are scoped to one session
        assert!(!table.is_delegate(Uuid::new_v4(), member));

        table.revoke(session, member);
        assert!(!table.is_delegate(session, member));
    }
}

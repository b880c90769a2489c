use std::collections::HashMap;

use crate::common::types::SessionId;

/// Last heartbeat (epoch ms) of every session seen in a party.
#[derive(Debug, Default)]
pub struct Presence {
    members: HashMap<SessionId, u64>,
}

impl Presence {
    pub fn touch(&mut self, session: SessionId, now: u64) {
        self.members.insert(session, now);
    }

    /// Drops members silent for `timeout_ms` or longer and returns how many remain.
    pub fn sweep_and_count(&mut self, now: u64, timeout_ms: u64) -> usize {
        self.members
            .retain(|_, last_seen| now.saturating_sub(*last_seen) < timeout_ms);
        self.members.len()
    }

    /// Entries currently held, stale ones included.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use tokio::{sync::Mutex, task::JoinHandle};

use super::{
    presence::Presence,
    state::{PartyState, PlayingTrack},
};
use crate::common::types::{PartyCode, SessionId, TrackId};

/// One party: playback state, members and the task that advances its tracks.
pub struct Party {
    pub code: PartyCode,
    /// Held for the whole of a selection.
    pub state: Mutex<PartyState>,
    presence: parking_lot::Mutex<Presence>,
    last_activity: AtomicU64,
    playback_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl Party {
    fn new(code: PartyCode, history_len: usize, now: u64) -> Self {
        Self {
            code,
            state: Mutex::new(PartyState::new(history_len)),
            presence: parking_lot::Mutex::new(Presence::default()),
            last_activity: AtomicU64::new(now),
            playback_task: parking_lot::Mutex::new(None),
        }
    }

    pub fn mark_active(&self, now: u64) {
        self.last_activity.fetch_max(now, Ordering::Relaxed);
    }

    pub fn last_activity(&self) -> u64 {
        self.last_activity.load(Ordering::Relaxed)
    }

    /// Installs the playback task, aborting any previous one.
    pub(crate) fn replace_playback_task(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.playback_task.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn stop_playback(&self) {
        if let Some(task) = self.playback_task.lock().take() {
            task.abort();
        }
    }

    pub fn is_playback_running(&self) -> bool {
        self.playback_task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Party {
    fn drop(&mut self) {
        tracing::debug!("Dropping party: {}", self.code);
        self.stop_playback();
    }
}

/// All live parties, sharded by code so parties never contend with each other.
pub struct PartyTable {
    parties: DashMap<PartyCode, Arc<Party>>,
    history_len: usize,
}

impl PartyTable {
    pub fn new(history_len: usize) -> Self {
        Self {
            parties: DashMap::new(),
            history_len,
        }
    }

    pub fn get(&self, code: &PartyCode) -> Option<Arc<Party>> {
        self.parties.get(code).map(|entry| entry.value().clone())
    }

    pub fn get_or_create(&self, code: &PartyCode, now: u64) -> Arc<Party> {
        let party = self
            .parties
            .entry(code.clone())
            .or_insert_with(|| {
                tracing::info!("Created party: {}", code);
                Arc::new(Party::new(code.clone(), self.history_len, now))
            })
            .value()
            .clone();
        party.mark_active(now);
        party
    }

    pub async fn current_track(&self, code: &PartyCode) -> Option<PlayingTrack> {
        let party = self.get(code)?;
        let state = party.state.lock().await;
        state.current().cloned()
    }

    pub async fn set_current_track(&self, code: &PartyCode, playing: PlayingTrack, now: u64) {
        let party = self.get_or_create(code, now);
        party.state.lock().await.set_current(playing);
    }

    pub async fn append_history(&self, code: &PartyCode, track_id: TrackId, now: u64) {
        let party = self.get_or_create(code, now);
        party.state.lock().await.push_history(track_id);
    }

    pub async fn history(&self, code: &PartyCode) -> Vec<TrackId> {
        match self.get(code) {
            Some(party) => party.state.lock().await.history().iter().copied().collect(),
            None => Vec::new(),
        }
    }

    pub fn touch_member(&self, code: &PartyCode, session: SessionId, now: u64) {
        let party = self.get_or_create(code, now);
        party.presence.lock().touch(session, now);
    }

    /// Counts active members, deleting stale entries as it goes.
    pub fn sweep_and_count_members(&self, code: &PartyCode, now: u64, timeout_ms: u64) -> usize {
        match self.get(code) {
            Some(party) => party.presence.lock().sweep_and_count(now, timeout_ms),
            None => 0,
        }
    }

    /// Raw size of a party's member map, stale entries included.
    pub fn member_entries(&self, code: &PartyCode) -> usize {
        self.get(code)
            .map(|party| party.presence.lock().len())
            .unwrap_or(0)
    }

    /// Removes parties idle for `idle_timeout_ms` or longer and stops their playback.
    pub fn evict_idle(&self, now: u64, idle_timeout_ms: u64) -> Vec<PartyCode> {
        let mut evicted = Vec::new();
        self.parties.retain(|code, party| {
            let idle = now.saturating_sub(party.last_activity()) >= idle_timeout_ms;
            if idle {
                party.stop_playback();
                evicted.push(code.clone());
            }
            !idle
        });
        evicted
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

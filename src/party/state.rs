use std::{collections::VecDeque, time::Duration};

use tokio::time::Instant;

use crate::{catalog::Track, common::types::TrackId};

/// A track together with the moment it started playing for a party.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayingTrack {
    pub track: Track,
    /// Unix epoch milliseconds, as reported to clients.
    pub started_at: u64,
    /// Monotonic start used to arm the end-of-track timer.
    started: Instant,
}

impl PlayingTrack {
    pub fn start(track: Track, started_at: u64) -> Self {
        Self {
            track,
            started_at,
            started: Instant::now(),
        }
    }

    pub fn ends_at(&self) -> Instant {
        self.started + Duration::from_millis(self.track.duration)
    }
}

/// Mutable per-party playback state. Guarded by the party's async mutex so a
/// selection runs as one critical section.
#[derive(Debug)]
pub struct PartyState {
    current: Option<PlayingTrack>,
    history: VecDeque<TrackId>,
    history_len: usize,
}

impl PartyState {
    pub fn new(history_len: usize) -> Self {
        Self {
            current: None,
            history: VecDeque::with_capacity(history_len + 1),
            history_len: history_len.max(1),
        }
    }

    pub fn current(&self) -> Option<&PlayingTrack> {
        self.current.as_ref()
    }

    pub fn set_current(&mut self, playing: PlayingTrack) {
        self.current = Some(playing);
    }

    pub fn clear_current(&mut self) -> Option<PlayingTrack> {
        self.current.take()
    }

    /// Recently played ids, oldest first.
    pub fn history(&self) -> &VecDeque<TrackId> {
        &self.history
    }

    pub fn push_history(&mut self, track_id: TrackId) {
        self.history.push_back(track_id);
        while self.history.len() > self.history_len {
            self.history.pop_front();
        }
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::types::{PartyCode, SessionId, TrackId};

pub mod memory;

pub use memory::MemoryVoteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// One stored vote row. Unique per (party, track, session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub party_code: PartyCode,
    pub track_id: TrackId,
    pub session_id: SessionId,
    pub vote_type: VoteType,
    pub voted_at: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("vote store unavailable: {0}")]
    Unavailable(String),
    #[error("vote store query failed: {0}")]
    Query(String),
}

/// Persistent votes. Writes are upserts: the last vote a session casts on a
/// track replaces any earlier one.
#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn cast_vote(&self, vote: Vote) -> Result<(), StoreError>;

    /// Net score (`up - down`) of every voted track in the party.
    async fn net_scores(&self, party: &PartyCode) -> Result<HashMap<TrackId, i64>, StoreError>;

    async fn tally(&self, party: &PartyCode, track_id: TrackId) -> Result<VoteTally, StoreError>;

    async fn session_vote(
        &self,
        party: &PartyCode,
        track_id: TrackId,
        session: &SessionId,
    ) -> Result<Option<VoteType>, StoreError>;
}

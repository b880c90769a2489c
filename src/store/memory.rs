use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{StoreError, Vote, VoteStore, VoteTally, VoteType};
use crate::common::types::{PartyCode, SessionId, TrackId};

type VoteKey = (PartyCode, TrackId, SessionId);

/// Process-local vote store backed by a sharded map.
#[derive(Default)]
pub struct MemoryVoteStore {
    votes: DashMap<VoteKey, Vote>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows stored for a party, in no particular order.
    pub fn rows(&self, party: &PartyCode) -> Vec<Vote> {
        self.votes
            .iter()
            .filter(|entry| &entry.key().0 == party)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn cast_vote(&self, vote: Vote) -> Result<(), StoreError> {
        let key = (
            vote.party_code.clone(),
            vote.track_id,
            vote.session_id.clone(),
        );
        self.votes.insert(key, vote);
        Ok(())
    }

    async fn net_scores(&self, party: &PartyCode) -> Result<HashMap<TrackId, i64>, StoreError> {
        let mut scores: HashMap<TrackId, i64> = HashMap::new();
        for entry in self.votes.iter().filter(|e| &e.key().0 == party) {
            let delta = match entry.value().vote_type {
                VoteType::Up => 1,
                VoteType::Down => -1,
            };
            *scores.entry(entry.key().1).or_insert(0) += delta;
        }
        Ok(scores)
    }

    async fn tally(&self, party: &PartyCode, track_id: TrackId) -> Result<VoteTally, StoreError> {
        let mut tally = VoteTally::default();
        for entry in self
            .votes
            .iter()
            .filter(|e| &e.key().0 == party && e.key().1 == track_id)
        {
            match entry.value().vote_type {
                VoteType::Up => tally.upvotes += 1,
                VoteType::Down => tally.downvotes += 1,
            }
        }
        Ok(tally)
    }

    async fn session_vote(
        &self,
        party: &PartyCode,
        track_id: TrackId,
        session: &SessionId,
    ) -> Result<Option<VoteType>, StoreError> {
        let key = (party.clone(), track_id, session.clone());
        Ok(self.votes.get(&key).map(|v| v.vote_type))
    }
}

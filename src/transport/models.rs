use serde::{Deserialize, Serialize};

use crate::{common::types::TrackId, party::PlayingTrack, store::VoteType};

#[derive(Debug, Serialize, PartialEq)]
pub struct CurrentTrackResponse {
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    pub duration: u64,
    pub started_at: u64,
}

impl From<PlayingTrack> for CurrentTrackResponse {
    fn from(playing: PlayingTrack) -> Self {
        Self {
            track_id: playing.track.track_id,
            title: playing.track.title,
            artist: playing.track.artist,
            duration: playing.track.duration,
            started_at: playing.started_at,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct VotesResponse {
    pub upvotes: u64,
    pub downvotes: u64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MyVoteResponse {
    #[serde(rename = "myVote")]
    pub my_vote: Option<VoteType>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MembersResponse {
    pub count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub parties: usize,
    pub tracks: usize,
}

/// Body of `POST /vote`. Fields are optional so missing ones map to 400.
#[derive(Debug, Deserialize, Default)]
pub struct VoteRequest {
    pub vote: Option<String>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Body of `POST /heartbeat`.
#[derive(Debug, Deserialize, Default)]
pub struct HeartbeatRequest {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn my_vote_serializes_null_and_lowercase() {
        let none = serde_json::to_value(MyVoteResponse { my_vote: None }).unwrap();
        assert_eq!(none, serde_json::json!({ "myVote": null }));

        let up = serde_json::to_value(MyVoteResponse {
            my_vote: Some(VoteType::Up),
        })
        .unwrap();
        assert_eq!(up, serde_json::json!({ "myVote": "up" }));
    }

    #[test]
    fn vote_request_reads_camelcase_session() {
        let body: VoteRequest =
            serde_json::from_str(r#"{"vote":"down","sessionId":"tab-1"}"#).unwrap();
        assert_eq!(body.vote.as_deref(), Some("down"));
        assert_eq!(body.session_id.as_deref(), Some("tab-1"));

        let empty: VoteRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.vote.is_none() && empty.session_id.is_none());
    }
}

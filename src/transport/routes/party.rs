use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, Path, State, rejection::JsonRejection},
};

use crate::{
    common::{
        ApiError,
        types::{PartyCode, SessionId},
    },
    party::PartyError,
    server::AppState,
    transport::models::{
        CurrentTrackResponse, HeartbeatRequest, MembersResponse, MyVoteResponse, SuccessResponse,
        VoteRequest, VotesResponse,
    },
};

fn api_error(err: PartyError, path: &str) -> ApiError {
    match err {
        PartyError::Validation(message) => ApiError::bad_request(message, path),
        PartyError::NotFound(message) => ApiError::not_found(message, path),
        err @ (PartyError::Store(_) | PartyError::NoCandidates) => {
            ApiError::internal(err.to_string(), path)
        }
    }
}

/// GET /api/party/{code}/currentTrack
pub async fn current_track(
    Path(code): Path<PartyCode>,
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<CurrentTrackResponse>, ApiError> {
    state
        .service
        .current_track(&code)
        .await
        .map(|playing| Json(CurrentTrackResponse::from(playing)))
        .map_err(|e| api_error(e, uri.path()))
}

/// GET /api/party/{code}/votes
pub async fn votes(
    Path(code): Path<PartyCode>,
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<VotesResponse>, ApiError> {
    let tally = state
        .service
        .votes(&code)
        .await
        .map_err(|e| api_error(e, uri.path()))?;
    Ok(Json(VotesResponse {
        upvotes: tally.upvotes,
        downvotes: tally.downvotes,
    }))
}

/// GET /api/party/{code}/myvote/{sessionId}
pub async fn my_vote(
    Path((code, session_id)): Path<(PartyCode, SessionId)>,
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<MyVoteResponse>, ApiError> {
    let my_vote = state
        .service
        .my_vote(&code, &session_id)
        .await
        .map_err(|e| api_error(e, uri.path()))?;
    Ok(Json(MyVoteResponse { my_vote }))
}

/// POST /api/party/{code}/vote
pub async fn vote(
    Path(code): Path<PartyCode>,
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text(), uri.path()))?;
    state
        .service
        .vote(&code, body.vote.as_deref(), body.session_id.as_deref())
        .await
        .map_err(|e| api_error(e, uri.path()))?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/party/{code}/heartbeat
pub async fn heartbeat(
    Path(code): Path<PartyCode>,
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text(), uri.path()))?;
    state
        .service
        .heartbeat(&code, body.session_id.as_deref())
        .map_err(|e| api_error(e, uri.path()))?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/party/{code}/members
pub async fn members(
    Path(code): Path<PartyCode>,
    State(state): State<Arc<AppState>>,
) -> Json<MembersResponse> {
    Json(MembersResponse {
        count: state.service.member_count(&code),
    })
}

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    server::AppState,
    transport::{
        middleware::add_response_headers,
        routes::{health, party},
    },
};

const API: &str = "/api";

pub fn router(state: Arc<AppState>) -> Router {
    let party_routes = Router::new()
        .route("/{code}/currentTrack", get(party::current_track))
        .route("/{code}/votes", get(party::votes))
        .route("/{code}/myvote/{session_id}", get(party::my_vote))
        .route("/{code}/vote", post(party::vote))
        .route("/{code}/heartbeat", post(party::heartbeat))
        .route("/{code}/members", get(party::members));

    let api_routes = Router::new()
        .nest("/party", party_routes)
        .route("/health", get(health::health));

    let router = Router::new()
        .nest(API, api_routes)
        .layer(middleware::from_fn(add_response_headers))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.server.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

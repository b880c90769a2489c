use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{server::AppState, transport::models::HealthResponse};

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        parties: state.service.table().len(),
        tracks: state.service.catalog().len(),
    })
}

use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

/// GET /health
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let sessions = state.sessions.live_count()?;
    Ok(Json(HealthResponse {
        status: "ok",
        sessions,
    }))
}

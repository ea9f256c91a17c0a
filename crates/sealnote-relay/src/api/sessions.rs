use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use sealnote_core::relay::SESSION_TTL;

use crate::{error::ApiError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub session_id: String,
    pub challenge: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub success: bool,
    /// Seconds until the session expires
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub assertion: Option<String>,
    /// Unix milliseconds
    pub expires_at: i64,
    pub challenge: String,
}

#[derive(Debug, Deserialize)]
pub struct StoreAssertionRequest {
    pub assertion: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/session
/// Open a session the second device can answer.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let Json(req) = payload?;

    state
        .sessions
        .create(&req.session_id, &req.challenge)
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to create session");
            ApiError::from(e)
        })?;

    tracing::info!(session_id = %req.session_id, "Session created");

    Ok(Json(CreateSessionResponse {
        success: true,
        expires_in: SESSION_TTL.as_secs(),
    }))
}

/// GET /api/session/:session_id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state.sessions.get(&session_id)?;

    tracing::debug!(
        session_id = %session_id,
        answered = session.assertion.is_some(),
        "Session polled"
    );

    Ok(Json(SessionResponse {
        assertion: session.assertion,
        expires_at: session.expires_at,
        challenge: session.challenge,
    }))
}

/// POST /api/session/:session_id/assertion
/// Attach the second device's assertion. Write-once.
pub async fn store_assertion(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<StoreAssertionRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(req) = payload?;

    state
        .sessions
        .store_assertion(&session_id, &req.assertion)
        .map_err(|e| {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to store assertion");
            ApiError::from(e)
        })?;

    tracing::info!(session_id = %session_id, "Assertion stored");

    Ok(Json(SuccessResponse { success: true }))
}

//! # Sealnote Relay
//!
//! A small HTTP service that carries one WebAuthn assertion from a second
//! device to the device waiting to unlock. Sessions live in memory, expire
//! after two minutes and accept exactly one assertion. The relay never sees
//! key material; it stores opaque strings.

pub mod config;
pub mod error;
pub mod state;

mod api;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use state::AppState;

/// Request bodies above this size are refused before parsing.
const MAX_BODY_BYTES: usize = 64 * 1024;

fn build_cors_layer() -> CorsLayer {
    // Any origin may poll; sessions are unguessable ids.
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/session", post(api::sessions::create_session))
        .route("/api/session/:session_id", get(api::sessions::get_session))
        .route(
            "/api/session/:session_id/assertion",
            post(api::sessions::store_assertion),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(build_cors_layer())
        .with_state(state)
}

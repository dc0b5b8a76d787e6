//! REST + SSE API for the session coordinator
//!
//! One route per inbound command, plus the per-session SSE event
//! stream and a read-only snapshot endpoint for reconnect resync.

pub mod handlers;
pub mod sse;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::gateway::SessionGateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppContext {
    pub gateway: Arc<SessionGateway>,
}

/// Create the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))

        // Session membership
        .route("/sessions/:session_id/join", post(handlers::join_session))
        .route("/sessions/:session_id/leave", post(handlers::leave_session))

        // Read-only snapshot (reconnect without re-joining)
        .route("/sessions/:session_id", get(handlers::get_snapshot))

        // Queue commands
        .route("/sessions/:session_id/tracks", post(handlers::add_track))
        .route(
            "/sessions/:session_id/tracks/:track_id",
            delete(handlers::remove_track),
        )
        .route(
            "/sessions/:session_id/tracks/:track_id/vote",
            post(handlers::vote),
        )

        // Suggestion workflow
        .route(
            "/sessions/:session_id/suggestions",
            post(handlers::propose_track),
        )
        .route(
            "/sessions/:session_id/suggestions/:suggestion_id/approve",
            post(handlers::approve_suggestion),
        )
        .route(
            "/sessions/:session_id/suggestions/:suggestion_id/reject",
            post(handlers::reject_suggestion),
        )

        // Transport commands
        .route("/sessions/:session_id/advance", post(handlers::advance))
        .route("/sessions/:session_id/playback", post(handlers::set_playback))

        // SSE event stream
        .route("/sessions/:session_id/events", get(sse::event_stream))

        .with_state(ctx)

        // Enable CORS for browser clients
        .layer(CorsLayer::permissive())
}

//! HTTP request handlers
//!
//! Implements the inbound command surface. Every handler goes through
//! the command gateway; errors stay local to the calling connection
//! and never produce a broadcast.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chorus_common::model::{
    SessionSnapshot, Suggestion, TrackRecord, VoteDirection,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::api::AppContext;
use crate::error::Error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            status: format!("error: {}", message),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub member_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MemberQuery {
    pub member_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub member_id: Uuid,
    pub source_ref: String,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub member_id: Uuid,
    pub direction: VoteDirection,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub track_id: Uuid,
    pub likes: usize,
    pub dislikes: usize,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub member_id: Uuid,
    pub observed_version: u64,
}

#[derive(Debug, Deserialize)]
pub struct PlaybackRequest {
    pub member_id: Uuid,
    pub is_playing: bool,
    pub position_ms: u64,
}

type HandlerError = (StatusCode, Json<StatusResponse>);

/// Map a gateway error onto an HTTP response
fn error_response(e: Error) -> HandlerError {
    let status = match &e {
        Error::NotAuthorized(_) => StatusCode::FORBIDDEN,
        Error::InvalidTarget(_) => StatusCode::CONFLICT,
        Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
        Error::Catalog(_) => StatusCode::BAD_GATEWAY,
        Error::Config(_) | Error::Http(_) | Error::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error!("Command failed: {}", e);
    (status, Json(StatusResponse::error(e.to_string())))
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "session_coordinator".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Session Membership Endpoints
// ============================================================================

/// POST /sessions/:session_id/join - Join (creating on first join)
///
/// Returns the full snapshot to the joining connection only; the rest
/// of the roster sees a MemberJoined event.
pub async fn join_session(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<SessionSnapshot>, HandlerError> {
    info!("Join request: session {} member {}", session_id, req.member_id);

    let snapshot = ctx
        .gateway
        .join(session_id, req.member_id)
        .await
        .map_err(error_response)?;
    Ok(Json(snapshot))
}

/// POST /sessions/:session_id/leave - Leave the session
pub async fn leave_session(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    info!("Leave request: session {} member {}", session_id, req.member_id);

    ctx.gateway
        .leave(session_id, req.member_id)
        .await
        .map_err(error_response)?;
    Ok(Json(StatusResponse::ok()))
}

/// GET /sessions/:session_id - Read-only snapshot
pub async fn get_snapshot(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, HandlerError> {
    let snapshot = ctx
        .gateway
        .snapshot(session_id)
        .await
        .map_err(error_response)?;
    Ok(Json(snapshot))
}

// ============================================================================
// Queue Endpoints
// ============================================================================

/// POST /sessions/:session_id/tracks - Directly enqueue a track
pub async fn add_track(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AddTrackRequest>,
) -> Result<Json<TrackRecord>, HandlerError> {
    info!(
        "Add track request: session {} source_ref {}",
        session_id, req.source_ref
    );

    let track = ctx
        .gateway
        .add_track(session_id, req.member_id, req.source_ref)
        .await
        .map_err(error_response)?;
    Ok(Json(track))
}

/// DELETE /sessions/:session_id/tracks/:track_id - Remove a track
///
/// Host/delegate only; fails on played tracks. Removing the current
/// track auto-promotes the next ranked queued track.
pub async fn remove_track(
    State(ctx): State<AppContext>,
    Path((session_id, track_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<MemberQuery>,
) -> Result<StatusCode, HandlerError> {
    info!(
        "Remove track request: session {} track {}",
        session_id, track_id
    );

    ctx.gateway
        .remove_track(session_id, query.member_id, track_id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /sessions/:session_id/tracks/:track_id/vote - Cast a vote
///
/// Upserts the member's vote; the response carries the recomputed
/// tally, matching the VoteUpdated broadcast.
pub async fn vote(
    State(ctx): State<AppContext>,
    Path((session_id, track_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, HandlerError> {
    let tally = ctx
        .gateway
        .vote(session_id, req.member_id, track_id, req.direction)
        .await
        .map_err(error_response)?;
    Ok(Json(VoteResponse {
        track_id,
        likes: tally.likes,
        dislikes: tally.dislikes,
    }))
}

// ============================================================================
// Suggestion Endpoints
// ============================================================================

/// POST /sessions/:session_id/suggestions - Propose a track
pub async fn propose_track(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AddTrackRequest>,
) -> Result<Json<Suggestion>, HandlerError> {
    info!(
        "Propose request: session {} source_ref {}",
        session_id, req.source_ref
    );

    let suggestion = ctx
        .gateway
        .propose(session_id, req.member_id, req.source_ref)
        .await
        .map_err(error_response)?;
    Ok(Json(suggestion))
}

/// POST /sessions/:session_id/suggestions/:suggestion_id/approve
pub async fn approve_suggestion(
    State(ctx): State<AppContext>,
    Path((session_id, suggestion_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    ctx.gateway
        .resolve_suggestion(session_id, req.member_id, suggestion_id, true)
        .await
        .map_err(error_response)?;
    Ok(Json(StatusResponse::ok()))
}

/// POST /sessions/:session_id/suggestions/:suggestion_id/reject
pub async fn reject_suggestion(
    State(ctx): State<AppContext>,
    Path((session_id, suggestion_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    ctx.gateway
        .resolve_suggestion(session_id, req.member_id, suggestion_id, false)
        .await
        .map_err(error_response)?;
    Ok(Json(StatusResponse::ok()))
}

// ============================================================================
// Transport Endpoints
// ============================================================================

/// POST /sessions/:session_id/advance - Promote the next ranked track
///
/// Carries the caller's observed version; a stale version is a benign
/// no-op and the response is simply the current state either way.
pub async fn advance(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<SessionSnapshot>, HandlerError> {
    info!(
        "Advance request: session {} observed version {}",
        session_id, req.observed_version
    );

    let snapshot = ctx
        .gateway
        .advance(session_id, req.member_id, req.observed_version)
        .await
        .map_err(error_response)?;
    Ok(Json(snapshot))
}

/// POST /sessions/:session_id/playback - Update transport metadata
pub async fn set_playback(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<PlaybackRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    ctx.gateway
        .set_playback(session_id, req.member_id, req.is_playing, req.position_ms)
        .await
        .map_err(error_response)?;
    Ok(Json(StatusResponse::ok()))
}

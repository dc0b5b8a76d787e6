//! Server-Sent Events (SSE) broadcaster
//!
//! Streams a session's typed events to its connected members. Each
//! connection subscribes to the session's broadcast channel; events
//! arrive in the exact order mutations were applied. Delivery is lossy
//! for a lagging client, which recovers via the snapshot endpoint
//! rather than redelivery.

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::handlers::StatusResponse;
use crate::api::AppContext;
use axum::{http::StatusCode, Json};

/// GET /sessions/:session_id/events - SSE event stream
pub async fn event_stream(
    State(ctx): State<AppContext>,
    Path(session_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, Json<StatusResponse>)>
{
    debug!("New SSE client connected to session {}", session_id);

    let rx = ctx.gateway.subscribe(session_id).await.map_err(|e| {
        (
            StatusCode::NOT_FOUND,
            Json(StatusResponse::error(format!("{}", e))),
        )
    })?;

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    debug!("Broadcasting SSE event: {}", event.event_type());
                    Some(Ok(Event::default().event(event.event_type()).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged receiver: skip the dropped range and continue;
                // the client reconciles from its cached version
                warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

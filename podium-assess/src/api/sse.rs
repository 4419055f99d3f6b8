//! Server-Sent Events (SSE) for assessment progress streaming
//!
//! Clients can watch upload and pipeline progress here instead of
//! polling the status endpoint.
//!
//! Streamed events:
//! - UploadCompleted
//! - AssessmentQueued
//! - AssessmentProgress (at every pipeline checkpoint)
//! - AssessmentCompleted
//! - AssessmentFailed

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tracing::info;

/// GET /events - SSE event stream for upload and assessment progress
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to assessment events");

    podium_common::sse::event_sse_stream(&state.event_bus)
}

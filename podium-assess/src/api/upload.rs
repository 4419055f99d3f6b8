//! Chunked upload API handlers
//!
//! POST /upload/init, PUT /upload/chunk/{id}/{index},
//! POST /upload/complete/{id}, DELETE /upload/cancel/{id}
//!
//! Chunk bodies are raw bytes; the per-request body limit is the
//! configured chunk ceiling so an oversized chunk is rejected at the
//! transport layer.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    routing::{delete, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::workflow::PipelineJob;
use crate::{db, AppState};
use podium_common::events::PodiumEvent;

/// POST /upload/init request
#[derive(Debug, Deserialize)]
pub struct InitUploadRequest {
    pub filename: String,
    pub file_size: u64,
    pub total_chunks: u32,
}

/// POST /upload/init response
#[derive(Debug, Serialize)]
pub struct InitUploadResponse {
    pub upload_id: Uuid,
    pub recommended_chunk_size: u64,
    pub message: String,
}

/// PUT /upload/chunk response
#[derive(Debug, Serialize)]
pub struct ChunkUploadResponse {
    pub upload_id: Uuid,
    pub chunk_index: u32,
    pub received_chunks: u32,
    pub total_chunks: u32,
}

/// POST /upload/complete response
#[derive(Debug, Serialize)]
pub struct CompleteUploadResponse {
    pub assessment_id: Uuid,
    pub filename: String,
    pub message: String,
}

/// POST /upload/init
///
/// Validate the declared file and open a chunked upload session.
pub async fn init_upload(
    State(state): State<AppState>,
    Json(request): Json<InitUploadRequest>,
) -> ApiResult<Json<InitUploadResponse>> {
    let session = state
        .uploads
        .init(&request.filename, request.file_size, request.total_chunks)
        .await?;

    Ok(Json(InitUploadResponse {
        upload_id: session.session_id,
        recommended_chunk_size: state.config.recommended_chunk_size,
        message: "Upload session initialized".to_string(),
    }))
}

/// PUT /upload/chunk/{upload_id}/{chunk_index}
///
/// Store one chunk. Chunks may arrive in any order and may be retried;
/// re-upload of an index overwrites the bytes without changing the count.
pub async fn upload_chunk(
    State(state): State<AppState>,
    Path((upload_id, chunk_index)): Path<(Uuid, u32)>,
    body: Bytes,
) -> ApiResult<Json<ChunkUploadResponse>> {
    let (received_chunks, total_chunks) = state
        .uploads
        .put_chunk(upload_id, chunk_index, &body)
        .await?;

    Ok(Json(ChunkUploadResponse {
        upload_id,
        chunk_index,
        received_chunks,
        total_chunks,
    }))
}

/// POST /upload/complete/{upload_id}
///
/// Reassemble the file, create the assessment and hand it to the
/// pipeline queue. The queue submission awaits capacity, so bursts of
/// completions slow down here rather than overwhelming the workers.
pub async fn complete_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
) -> ApiResult<Json<CompleteUploadResponse>> {
    let completed = state.uploads.complete(upload_id).await?;

    db::assessments::create_assessment(&state.db, completed.assessment_id, &completed.filename)
        .await?;

    state.event_bus.emit_lossy(PodiumEvent::UploadCompleted {
        session_id: upload_id,
        assessment_id: completed.assessment_id,
        timestamp: Utc::now(),
    });

    state
        .pipeline
        .submit(PipelineJob {
            assessment_id: completed.assessment_id,
            video_path: completed.file_path,
        })
        .await?;

    state.event_bus.emit_lossy(PodiumEvent::AssessmentQueued {
        assessment_id: completed.assessment_id,
        timestamp: Utc::now(),
    });

    tracing::info!(
        upload_id = %upload_id,
        assessment_id = %completed.assessment_id,
        "Upload completed and queued for assessment"
    );

    Ok(Json(CompleteUploadResponse {
        assessment_id: completed.assessment_id,
        filename: completed.filename,
        message: "File uploaded and reassembled successfully".to_string(),
    }))
}

/// DELETE /upload/cancel/{upload_id}
///
/// Cancel the session and delete partial chunk data. Cancelling an
/// already-terminal session succeeds without effect.
pub async fn cancel_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state.uploads.cancel(upload_id).await?;

    Ok(Json(json!({
        "message": "Upload cancelled and cleaned up"
    })))
}

/// Build upload routes
pub fn upload_routes(max_chunk_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload/init", post(init_upload))
        .route(
            "/upload/chunk/:upload_id/:chunk_index",
            put(upload_chunk).layer(DefaultBodyLimit::max(max_chunk_bytes)),
        )
        .route("/upload/complete/:upload_id", post(complete_upload))
        .route("/upload/cancel/:upload_id", delete(cancel_upload))
}

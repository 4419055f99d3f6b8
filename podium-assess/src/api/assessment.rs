//! Assessment status and report API handlers
//!
//! GET /assessment/status/{id}, GET /assessment/report/{id}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::AssessmentState;
use crate::{db, AppState};

/// GET /assessment/status response
#[derive(Debug, Serialize)]
pub struct AssessmentStatusResponse {
    pub assessment_id: Uuid,
    pub status: AssessmentState,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /assessment/status/{assessment_id}
///
/// Poll pipeline progress. Safe to call concurrently with an in-flight
/// run; always returns the latest committed whole-row state.
pub async fn get_status(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> ApiResult<Json<AssessmentStatusResponse>> {
    let status = db::assessments::load_status(&state.db, assessment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Assessment not found: {}", assessment_id)))?;

    tracing::debug!(assessment_id = %assessment_id, state = ?status.state, "Status query");

    Ok(Json(AssessmentStatusResponse {
        assessment_id: status.assessment_id,
        status: status.state,
        progress: status.progress,
        message: status.message,
        error: status.error,
    }))
}

/// GET /assessment/report/{assessment_id}
///
/// Fetch the final report. Returns 202 while the pipeline is still
/// running and 500 with the stage error if the assessment failed.
pub async fn get_report(
    State(state): State<AppState>,
    Path(assessment_id): Path<Uuid>,
) -> ApiResult<Response> {
    let status = db::assessments::load_status(&state.db, assessment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Assessment not found: {}", assessment_id)))?;

    match status.state {
        AssessmentState::Queued | AssessmentState::Processing => Ok((
            StatusCode::ACCEPTED,
            Json(json!({
                "assessment_id": assessment_id,
                "status": status.state,
                "progress": status.progress,
                "message": "Assessment still processing",
            })),
        )
            .into_response()),
        AssessmentState::Failed => Err(ApiError::Internal(format!(
            "Assessment failed: {}",
            status.error.unwrap_or_else(|| "unknown error".to_string())
        ))),
        AssessmentState::Completed => {
            let report = db::assessments::load_report(&state.db, assessment_id)
                .await?
                .ok_or_else(|| {
                    ApiError::Internal(format!(
                        "Report missing for completed assessment: {}",
                        assessment_id
                    ))
                })?;

            Ok(Json(report).into_response())
        }
    }
}

/// Build assessment routes
pub fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/assessment/status/:assessment_id", get(get_status))
        .route("/assessment/report/:assessment_id", get(get_report))
}

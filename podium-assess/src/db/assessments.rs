//! Assessment status and report persistence
//!
//! The status row is written only by the pipeline run that owns the
//! assessment and read by arbitrary pollers; every write replaces whole
//! fields so a reader never observes a torn record. Progress updates go
//! through MAX(progress, ?) so the stored value never regresses.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{AssessmentReport, AssessmentState, AssessmentStatus};
use podium_common::{Error, Result};

/// Insert a freshly queued assessment
pub async fn create_assessment(
    pool: &SqlitePool,
    assessment_id: Uuid,
    source_filename: &str,
) -> Result<()> {
    let state = serde_json::to_string(&AssessmentState::Queued)
        .map_err(|e| Error::Internal(format!("Failed to serialize state: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO assessments (
            assessment_id, state, progress, message, source_filename, created_at
        ) VALUES (?, ?, 0, 'Queued for processing...', ?, ?)
        "#,
    )
    .bind(assessment_id.to_string())
    .bind(state)
    .bind(source_filename)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the status record for polling
pub async fn load_status(pool: &SqlitePool, assessment_id: Uuid) -> Result<Option<AssessmentStatus>> {
    let row = sqlx::query(
        r#"
        SELECT assessment_id, state, progress, message, error, created_at, ended_at
        FROM assessments
        WHERE assessment_id = ?
        "#,
    )
    .bind(assessment_id.to_string())
    .fetch_optional(pool)
    .await?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let state: String = row.get("state");
    let state: AssessmentState = serde_json::from_str(&state)
        .map_err(|e| Error::Internal(format!("Failed to deserialize state: {}", e)))?;

    let created_at: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Failed to parse created_at: {}", e)))?
        .with_timezone(&Utc);

    let ended_at: Option<String> = row.get("ended_at");
    let ended_at = ended_at
        .map(|s| DateTime::parse_from_rfc3339(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to parse ended_at: {}", e)))?
        .map(|dt| dt.with_timezone(&Utc));

    Ok(Some(AssessmentStatus {
        assessment_id,
        state,
        progress: row.get::<i64, _>("progress") as u8,
        message: row.get("message"),
        error: row.get("error"),
        created_at,
        ended_at,
    }))
}

/// Advance the run to PROCESSING at the given checkpoint
///
/// MAX(progress, ?) keeps the stored percentage non-decreasing even if
/// updates land out of order.
pub async fn update_progress(
    pool: &SqlitePool,
    assessment_id: Uuid,
    progress: u8,
    message: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE assessments
        SET state = '"PROCESSING"',
            progress = MAX(progress, ?),
            message = ?
        WHERE assessment_id = ?
        "#,
    )
    .bind(progress as i64)
    .bind(message)
    .bind(assessment_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark the assessment COMPLETED at progress 100 and persist its report
pub async fn mark_completed(
    pool: &SqlitePool,
    assessment_id: Uuid,
    report: &AssessmentReport,
) -> Result<()> {
    let report_json = serde_json::to_string(report)
        .map_err(|e| Error::Internal(format!("Failed to serialize report: {}", e)))?;

    sqlx::query(
        r#"
        UPDATE assessments
        SET state = '"COMPLETED"',
            progress = 100,
            message = 'Assessment complete!',
            report = ?,
            ended_at = ?
        WHERE assessment_id = ?
        "#,
    )
    .bind(report_json)
    .bind(Utc::now().to_rfc3339())
    .bind(assessment_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark the assessment FAILED with the stage error
pub async fn mark_failed(pool: &SqlitePool, assessment_id: Uuid, error: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE assessments
        SET state = '"FAILED"',
            message = 'Processing failed',
            error = ?,
            ended_at = ?
        WHERE assessment_id = ?
        "#,
    )
    .bind(error)
    .bind(Utc::now().to_rfc3339())
    .bind(assessment_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the persisted report, present only for COMPLETED assessments
pub async fn load_report(pool: &SqlitePool, assessment_id: Uuid) -> Result<Option<AssessmentReport>> {
    let report_json: Option<Option<String>> =
        sqlx::query_scalar("SELECT report FROM assessments WHERE assessment_id = ?")
            .bind(assessment_id.to_string())
            .fetch_optional(pool)
            .await?;

    match report_json.flatten() {
        Some(json) => {
            let report: AssessmentReport = serde_json::from_str(&json)
                .map_err(|e| Error::Internal(format!("Failed to deserialize report: {}", e)))?;
            Ok(Some(report))
        }
        None => Ok(None),
    }
}

/// Fail assessments interrupted by a restart
///
/// Any assessment not in a terminal state at startup belonged to a
/// previous process; its pipeline task died with that process and the
/// run will never finish.
pub async fn fail_interrupted(pool: &SqlitePool) -> Result<usize> {
    let result = sqlx::query(
        r#"
        UPDATE assessments
        SET state = '"FAILED"',
            message = 'Processing failed',
            error = 'Assessment interrupted by service restart',
            ended_at = ?
        WHERE state NOT IN ('"COMPLETED"', '"FAILED"')
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() as usize)
}

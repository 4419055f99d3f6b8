//! Pipeline orchestrator
//!
//! Drives one assessment through the analysis stages as a single logical
//! unit of work:
//!
//! audio → visual → narrative → scoring → report
//!
//! Progress checkpoints: 0 (queued) → 40 (audio) → 70 (visual) →
//! 85 (narrative) → 95 (scores) → 100 (report persisted). Any analyzer
//! failure marks the assessment FAILED and stops the run; a report
//! failure degrades to the deterministic template instead. The source
//! file is deleted on every exit path.

use chrono::Utc;
use sqlx::SqlitePool;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::db;
use crate::models::AssessmentReport;
use crate::scoring;
use crate::services::{ReportWriter, StageError, Stages};
use podium_common::events::{EventBus, PodiumEvent};

/// Pipeline orchestrator shared by all workers
pub struct PipelineOrchestrator {
    db: SqlitePool,
    event_bus: EventBus,
    stages: Stages,
    stage_timeout: Duration,
}

/// Deletes the source video when dropped, covering every exit path of a
/// run including stage failures
struct SourceFileGuard {
    path: PathBuf,
}

impl Drop for SourceFileGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(file = %self.path.display(), "Source video removed");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    file = %self.path.display(),
                    error = %e,
                    "Failed to remove source video"
                );
            }
        }
    }
}

impl PipelineOrchestrator {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        stages: Stages,
        stage_timeout: Duration,
    ) -> Self {
        Self {
            db,
            event_bus,
            stages,
            stage_timeout,
        }
    }

    /// Run the pipeline for one assessment to a terminal state
    ///
    /// Never returns an error: failures are recorded on the assessment
    /// row and broadcast, and the source file is removed regardless of
    /// outcome.
    pub async fn run(&self, assessment_id: Uuid, video_path: PathBuf) {
        let _guard = SourceFileGuard {
            path: video_path.clone(),
        };

        match self.run_pipeline(assessment_id, &video_path).await {
            Ok(overall_score) => {
                tracing::info!(
                    assessment_id = %assessment_id,
                    overall_score,
                    "Assessment completed"
                );
                self.event_bus.emit_lossy(PodiumEvent::AssessmentCompleted {
                    assessment_id,
                    overall_score,
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                let error = e.to_string();
                tracing::error!(
                    assessment_id = %assessment_id,
                    error = %error,
                    "Assessment failed"
                );

                if let Err(db_err) =
                    db::assessments::mark_failed(&self.db, assessment_id, &error).await
                {
                    tracing::error!(
                        assessment_id = %assessment_id,
                        error = %db_err,
                        "Failed to record assessment failure"
                    );
                }

                self.event_bus.emit_lossy(PodiumEvent::AssessmentFailed {
                    assessment_id,
                    error,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    async fn run_pipeline(
        &self,
        assessment_id: Uuid,
        video_path: &Path,
    ) -> anyhow::Result<f64> {
        self.checkpoint(assessment_id, 0, "Extracting and analyzing audio...")
            .await?;

        let audio = self
            .bounded(self.stages.audio.analyze(video_path))
            .await?;

        self.checkpoint(
            assessment_id,
            40,
            "Analyzing video (pose, expressions, gestures)...",
        )
        .await?;

        let visual = self
            .bounded(self.stages.visual.analyze(video_path))
            .await?;

        self.checkpoint(assessment_id, 70, "Analyzing storytelling and narrative...")
            .await?;

        let narrative = self
            .bounded(
                self.stages
                    .narrative
                    .analyze(&audio.transcript, audio.duration_seconds),
            )
            .await?;

        self.checkpoint(assessment_id, 85, "Calculating scores...")
            .await?;

        let scores = scoring::generate_scores(&audio, &visual, &narrative);

        self.checkpoint(assessment_id, 95, "Generating coaching report...")
            .await?;

        let report_text = match self
            .bounded(
                self.stages
                    .report
                    .generate(&scores, &audio, &visual, &narrative),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    assessment_id = %assessment_id,
                    error = %e,
                    "Report generation failed, falling back to template report"
                );
                ReportWriter::template_report(&scores, &audio, &visual, &narrative)
            }
        };

        let report = AssessmentReport {
            assessment_id,
            overall_score: scores.overall_score,
            communication_score: scores.communication_score,
            appearance_score: scores.appearance_score,
            storytelling_score: scores.storytelling_score,
            buckets: scores.buckets,
            report_text,
            created_at: Utc::now(),
        };

        db::assessments::mark_completed(&self.db, assessment_id, &report).await?;

        self.event_bus.emit_lossy(PodiumEvent::AssessmentProgress {
            assessment_id,
            progress: 100,
            message: "Assessment complete!".to_string(),
            timestamp: Utc::now(),
        });

        Ok(report.overall_score)
    }

    /// Bound one stage call to the configured timeout
    async fn bounded<T>(
        &self,
        stage: impl Future<Output = Result<T, StageError>>,
    ) -> Result<T, StageError> {
        match tokio::time::timeout(self.stage_timeout, stage).await {
            Ok(result) => result,
            Err(_) => Err(StageError::Timeout(self.stage_timeout.as_secs())),
        }
    }

    /// Persist a progress checkpoint and broadcast it
    async fn checkpoint(
        &self,
        assessment_id: Uuid,
        progress: u8,
        message: &str,
    ) -> podium_common::Result<()> {
        db::assessments::update_progress(&self.db, assessment_id, progress, message).await?;

        self.event_bus.emit_lossy(PodiumEvent::AssessmentProgress {
            assessment_id,
            progress,
            message: message.to_string(),
            timestamp: Utc::now(),
        });

        Ok(())
    }
}

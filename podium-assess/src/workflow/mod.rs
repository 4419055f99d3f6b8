//! Assessment pipeline scheduling
//!
//! Completed uploads enter a bounded queue drained by a fixed pool of
//! workers. Submission awaits queue capacity, so a burst of upload
//! completions back-pressures the HTTP callers instead of spawning an
//! unbounded task per request.

pub mod orchestrator;

pub use orchestrator::PipelineOrchestrator;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use podium_common::Error;

/// One unit of pipeline work: a reassembled file owned by an assessment
#[derive(Debug)]
pub struct PipelineJob {
    /// Assessment UUID
    pub assessment_id: Uuid,
    /// Reassembled video file; the pipeline deletes it on every exit path
    pub video_path: PathBuf,
}

/// Submission handle for the pipeline queue
#[derive(Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<PipelineJob>,
}

impl PipelineHandle {
    /// Enqueue a job, waiting for queue capacity
    pub async fn submit(&self, job: PipelineJob) -> podium_common::Result<()> {
        self.tx
            .send(job)
            .await
            .map_err(|_| Error::Internal("Pipeline queue is closed".to_string()))
    }
}

/// Spawn the worker pool and return the submission handle
///
/// Workers share one receiver; each loops taking the next job and running
/// it to a terminal state. Run errors are recorded on the assessment by
/// the orchestrator, never propagated out of the worker.
pub fn spawn_workers(
    orchestrator: Arc<PipelineOrchestrator>,
    workers: usize,
    queue_capacity: usize,
) -> PipelineHandle {
    let (tx, rx) = mpsc::channel::<PipelineJob>(queue_capacity);
    let rx = Arc::new(Mutex::new(rx));

    for worker_id in 0..workers.max(1) {
        let rx = rx.clone();
        let orchestrator = orchestrator.clone();

        tokio::spawn(async move {
            tracing::info!(worker_id, "Pipeline worker started");

            loop {
                let job = { rx.lock().await.recv().await };
                let job = match job {
                    Some(job) => job,
                    None => break,
                };

                tracing::info!(
                    worker_id,
                    assessment_id = %job.assessment_id,
                    "Pipeline worker picked up assessment"
                );

                orchestrator.run(job.assessment_id, job.video_path).await;
            }

            tracing::info!(worker_id, "Pipeline worker stopped");
        });
    }

    PipelineHandle { tx }
}

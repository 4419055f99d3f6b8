//! Event types for the Podium event system
//!
//! Provides shared event definitions and the EventBus used to broadcast
//! assessment progress to SSE subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Podium event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission. All events carry the id of the entity they concern and a
/// server-side timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PodiumEvent {
    /// Chunked upload finished reassembly and an assessment was created
    UploadCompleted {
        /// Upload session UUID
        session_id: Uuid,
        /// Assessment UUID created for the reassembled file
        assessment_id: Uuid,
        /// When the upload completed
        timestamp: DateTime<Utc>,
    },

    /// Assessment accepted into the pipeline queue
    AssessmentQueued {
        /// Assessment UUID
        assessment_id: Uuid,
        /// When the assessment was queued
        timestamp: DateTime<Utc>,
    },

    /// Pipeline progress checkpoint reached
    ///
    /// Emitted at every stage boundary; progress values are
    /// non-decreasing within one assessment run.
    AssessmentProgress {
        /// Assessment UUID
        assessment_id: Uuid,
        /// Progress percentage (0-100)
        progress: u8,
        /// Human-readable current step (display only)
        message: String,
        /// When the checkpoint was reached
        timestamp: DateTime<Utc>,
    },

    /// Assessment pipeline finished successfully
    AssessmentCompleted {
        /// Assessment UUID
        assessment_id: Uuid,
        /// Final weighted overall score
        overall_score: f64,
        /// When the assessment completed
        timestamp: DateTime<Utc>,
    },

    /// Assessment pipeline failed
    AssessmentFailed {
        /// Assessment UUID
        assessment_id: Uuid,
        /// Stage error that failed the run
        error: String,
        /// When the assessment failed
        timestamp: DateTime<Utc>,
    },
}

impl PodiumEvent {
    /// Event type name used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            PodiumEvent::UploadCompleted { .. } => "UploadCompleted",
            PodiumEvent::AssessmentQueued { .. } => "AssessmentQueued",
            PodiumEvent::AssessmentProgress { .. } => "AssessmentProgress",
            PodiumEvent::AssessmentCompleted { .. } => "AssessmentCompleted",
            PodiumEvent::AssessmentFailed { .. } => "AssessmentFailed",
        }
    }
}

/// Central event distribution bus
///
/// Uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PodiumEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PodiumEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PodiumEvent,
    ) -> Result<usize, broadcast::error::SendError<PodiumEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Progress events are advisory; it is acceptable for nobody to be
    /// watching when they fire.
    pub fn emit_lossy(&self, event: PodiumEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No subscribers for event (ignored)");
        }
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

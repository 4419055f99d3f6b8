//! Assessment lifecycle and report types
//!
//! An assessment is created when an upload completes and progresses
//! QUEUED → PROCESSING → {COMPLETED, FAILED}. Progress is a 0-100
//! percentage that never decreases within one run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assessment pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssessmentState {
    /// Waiting for a pipeline worker
    Queued,
    /// Pipeline running
    Processing,
    /// Report available
    Completed,
    /// A stage failed; error field populated
    Failed,
}

impl AssessmentState {
    /// Check if the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssessmentState::Completed | AssessmentState::Failed)
    }
}

/// Assessment status record (the row polled by clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentStatus {
    /// Assessment UUID
    pub assessment_id: Uuid,
    /// Current pipeline state
    pub state: AssessmentState,
    /// Progress percentage, 0-100, non-decreasing within a run
    pub progress: u8,
    /// Human-readable current step (display only, not authoritative)
    pub message: String,
    /// Stage error, present only when FAILED
    pub error: Option<String>,
    /// When the assessment was created
    pub created_at: DateTime<Utc>,
    /// When the assessment reached a terminal state
    pub ended_at: Option<DateTime<Utc>>,
}

/// One measured parameter with its normalized score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterScore {
    /// Parameter name (e.g. "Speaking Rate")
    pub name: String,
    /// Normalized score in [0, 100]
    pub score: f64,
    /// Raw measured value, when the analyzer reports one
    pub raw_value: Option<f64>,
    /// Unit of the raw value
    pub unit: Option<String>,
    /// Human description of the observation
    pub description: String,
}

/// A named group of parameter scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketScore {
    /// Bucket name ("Communication", "Appearance & Nonverbal", "Storytelling")
    pub name: String,
    /// Arithmetic mean of parameter scores; exactly 0 for an empty bucket
    pub score: f64,
    /// Parameters in presentation order
    pub parameters: Vec<ParameterScore>,
}

/// Final assessment report, immutable once produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Owning assessment UUID
    pub assessment_id: Uuid,
    /// Weighted overall score
    pub overall_score: f64,
    /// Communication bucket score
    pub communication_score: f64,
    /// Appearance & Nonverbal bucket score
    pub appearance_score: f64,
    /// Storytelling bucket score
    pub storytelling_score: f64,
    /// All buckets with their parameters, in presentation order
    pub buckets: Vec<BucketScore>,
    /// Generated coaching narrative
    pub report_text: String,
    /// When the report was produced
    pub created_at: DateTime<Utc>,
}

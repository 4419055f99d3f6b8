//! External analysis stage adapters
//!
//! Each analysis stage is an opaque external collaborator consumed
//! through one uniform shape: a single call taking the minimum required
//! input and returning a typed feature bag, or failing with a
//! stage-specific error. The orchestrator reads nothing from a bag beyond
//! the named fields the scoring engine consumes.

pub mod audio_analyzer;
pub mod narrative_analyzer;
pub mod report_writer;
pub mod visual_analyzer;

pub use audio_analyzer::AudioAnalyzer;
pub use narrative_analyzer::NarrativeAnalyzer;
pub use report_writer::ReportWriter;
pub use visual_analyzer::VisualAnalyzer;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AssessConfig;
use crate::models::{AudioFeatures, NarrativeFeatures, VisualFeatures};
use crate::scoring::ScoreSummary;

/// User agent sent to the analyzer services
pub const USER_AGENT: &str = "podium-assess/0.1.0";

/// Analysis stage errors
#[derive(Debug, Error)]
pub enum StageError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Analyzer returned an error response
    #[error("Analyzer error {0}: {1}")]
    Api(u16, String),

    /// Failed to parse the analyzer response JSON
    #[error("Failed to parse analyzer response: {0}")]
    Parse(String),

    /// Stage exceeded the configured bound
    #[error("Stage timed out after {0} seconds")]
    Timeout(u64),

    /// Analyzer not configured or not reachable
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),
}

/// Audio stage: speech-to-text plus scored speech parameters
#[async_trait]
pub trait AudioStage: Send + Sync {
    async fn analyze(&self, video_path: &Path) -> Result<AudioFeatures, StageError>;
}

/// Visual stage: pose, expression and gesture parameters
#[async_trait]
pub trait VisualStage: Send + Sync {
    async fn analyze(&self, video_path: &Path) -> Result<VisualFeatures, StageError>;
}

/// Narrative stage: storytelling analysis over the audio stage's
/// transcript and duration (the only stage with a data dependency on a
/// prior stage's output)
#[async_trait]
pub trait NarrativeStage: Send + Sync {
    async fn analyze(
        &self,
        transcript: &str,
        duration_seconds: f64,
    ) -> Result<NarrativeFeatures, StageError>;
}

/// Report stage: coaching narrative text from scores and feature bags
#[async_trait]
pub trait ReportStage: Send + Sync {
    async fn generate(
        &self,
        scores: &ScoreSummary,
        audio: &AudioFeatures,
        visual: &VisualFeatures,
        narrative: &NarrativeFeatures,
    ) -> Result<String, StageError>;
}

/// The full adapter set the pipeline drives
#[derive(Clone)]
pub struct Stages {
    pub audio: Arc<dyn AudioStage>,
    pub visual: Arc<dyn VisualStage>,
    pub narrative: Arc<dyn NarrativeStage>,
    pub report: Arc<dyn ReportStage>,
}

impl Stages {
    /// Build the production adapters from configuration
    pub fn from_config(config: &AssessConfig) -> Result<Self, StageError> {
        Ok(Self {
            audio: Arc::new(AudioAnalyzer::new(config.audio_analyzer_url.clone())?),
            visual: Arc::new(VisualAnalyzer::new(config.visual_analyzer_url.clone())?),
            narrative: Arc::new(NarrativeAnalyzer::new(config.narrative_analyzer_url.clone())?),
            report: Arc::new(ReportWriter::new(
                config.report_api_url.clone(),
                config.report_api_key.clone(),
                config.report_model.clone(),
            )?),
        })
    }
}

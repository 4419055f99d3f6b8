//! Audio analysis service client
//!
//! Calls the external audio analyzer, which extracts the audio track,
//! transcribes it and scores the eight speech parameters. The response is
//! the AudioFeatures bag; the transcript and duration inside it feed the
//! narrative stage later.

use async_trait::async_trait;
use serde_json::json;
use std::path::Path;

use super::{AudioStage, StageError, USER_AGENT};
use crate::models::AudioFeatures;

/// Audio analyzer HTTP client
pub struct AudioAnalyzer {
    http_client: reqwest::Client,
    base_url: String,
}

impl AudioAnalyzer {
    /// Create a new client for the analyzer at `base_url`
    ///
    /// No per-request timeout is set here; the orchestrator bounds every
    /// stage call.
    pub fn new(base_url: String) -> Result<Self, StageError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StageError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }
}

#[async_trait]
impl AudioStage for AudioAnalyzer {
    async fn analyze(&self, video_path: &Path) -> Result<AudioFeatures, StageError> {
        let url = format!("{}/analyze", self.base_url);

        tracing::debug!(url = %url, file = %video_path.display(), "Querying audio analyzer");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "video_path": video_path.to_string_lossy() }))
            .send()
            .await
            .map_err(|e| StageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StageError::Api(status.as_u16(), error_text));
        }

        let features: AudioFeatures = response
            .json()
            .await
            .map_err(|e| StageError::Parse(e.to_string()))?;

        tracing::info!(
            duration_seconds = features.duration_seconds,
            transcript_words = features.transcript.split_whitespace().count(),
            "Audio analysis complete"
        );

        Ok(features)
    }
}

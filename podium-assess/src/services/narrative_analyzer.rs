//! Narrative analysis service client
//!
//! Calls the external narrative analyzer over the transcript and duration
//! produced by the audio stage (not the raw file) and returns the
//! NarrativeFeatures bag, including whether a story was detected at all.

use async_trait::async_trait;
use serde_json::json;

use super::{NarrativeStage, StageError, USER_AGENT};
use crate::models::NarrativeFeatures;

/// Narrative analyzer HTTP client
pub struct NarrativeAnalyzer {
    http_client: reqwest::Client,
    base_url: String,
}

impl NarrativeAnalyzer {
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
impl NarrativeStage for NarrativeAnalyzer {
    async fn analyze(
        &self,
        transcript: &str,
        duration_seconds: f64,
    ) -> Result<NarrativeFeatures, StageError> {
        let url = format!("{}/analyze", self.base_url);

        tracing::debug!(url = %url, duration_seconds, "Querying narrative analyzer");

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "transcript": transcript,
                "duration_seconds": duration_seconds,
            }))
            .send()
            .await
            .map_err(|e| StageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StageError::Api(status.as_u16(), error_text));
        }

        let features: NarrativeFeatures = response
            .json()
            .await
            .map_err(|e| StageError::Parse(e.to_string()))?;

        tracing::info!(
            has_story = features.has_story,
            story_count = features.story_count,
            "Narrative analysis complete"
        );

        Ok(features)
    }
}

//! Visual analysis service client
//!
//! Calls the external visual analyzer (pose estimation, expression and
//! gesture tracking) and returns the VisualFeatures bag.

use async_trait::async_trait;
use serde_json::json;
use std::path::Path;

use super::{StageError, VisualStage, USER_AGENT};
use crate::models::VisualFeatures;

/// Visual analyzer HTTP client
pub struct VisualAnalyzer {
    http_client: reqwest::Client,
    base_url: String,
}

impl VisualAnalyzer {
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
impl VisualStage for VisualAnalyzer {
    async fn analyze(&self, video_path: &Path) -> Result<VisualFeatures, StageError> {
        let url = format!("{}/analyze", self.base_url);

        tracing::debug!(url = %url, file = %video_path.display(), "Querying visual analyzer");

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

        let features: VisualFeatures = response
            .json()
            .await
            .map_err(|e| StageError::Parse(e.to_string()))?;

        tracing::info!(
            posture_score = features.posture.score,
            eye_contact_score = features.eye_contact.score,
            "Visual analysis complete"
        );

        Ok(features)
    }
}

//! Shared test helpers: stub stage adapters, app bootstrap against a
//! temporary storage root, and canned feature bags.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use podium_assess::config::AssessConfig;
use podium_assess::models::features::*;
use podium_assess::models::{AssessmentState, AssessmentStatus};
use podium_assess::scoring::ScoreSummary;
use podium_assess::services::{
    AudioStage, NarrativeStage, ReportStage, StageError, Stages, VisualStage,
};
use podium_assess::AppState;
use uuid::Uuid;

/// Canned audio bag with a transcript the narrative stub can echo
pub fn audio_features() -> AudioFeatures {
    AudioFeatures {
        transcript: "Once I led a team through a difficult launch. We learned a lot.".to_string(),
        duration_seconds: 180.0,
        speaking_rate: SpeakingRateFeature {
            wpm: 150.0,
            score: 100.0,
            description: "Speaking rate of 150 WPM".to_string(),
        },
        pitch: PitchFeature {
            mean_pitch_hz: 120.0,
            pitch_std: 26.0,
            pitch_score: 100.0,
            variety_score: 90.0,
        },
        volume: VolumeFeature {
            mean_volume_db: -15.0,
            score: 100.0,
        },
        pauses: PauseFeature {
            pauses_per_minute: 10.0,
            score: 90.0,
        },
        fillers: FillerFeature {
            fillers_per_100_words: 1.5,
            score: 100.0,
        },
        clarity: ClarityFeature {
            avg_sentence_length: 17.0,
            score: 100.0,
        },
        confidence: ConfidenceFeature {
            confidence_ratio: 0.75,
            score: 100.0,
        },
    }
}

pub fn visual_features() -> VisualFeatures {
    VisualFeatures {
        posture: PostureFeature {
            upright_ratio: 0.9,
            score: 85.0,
        },
        expansiveness: ExpansivenessFeature {
            avg_expansiveness: 0.3,
            score: 75.0,
        },
        eye_contact: EyeContactFeature {
            eye_contact_ratio: 0.7,
            score: 80.0,
        },
        expressions: ExpressionFeature {
            positive_expression_ratio: 0.4,
            score: 70.0,
        },
        gestures: GestureFeature {
            avg_gesture_amplitude: 0.02,
            score: 75.0,
        },
        first_impression: FirstImpressionFeature { score: 80.0 },
    }
}

pub fn narrative_features(has_story: bool) -> NarrativeFeatures {
    NarrativeFeatures {
        has_story,
        story_count: u32::from(has_story),
        narrative_structure: NarrativeStructureFeature {
            structure_complete: has_story,
            score: if has_story { 100.0 } else { 0.0 },
        },
        cognitive_ease: CognitiveEaseFeature {
            flesch_score: 70.0,
            score: 80.0,
        },
        self_disclosure: SelfDisclosureFeature {
            first_person_ratio: 5.0,
            score: 85.0,
        },
        memorability: MemorabilityFeature {
            specificity_ratio: 12.0,
            score: 100.0,
        },
        story_metrics: StoryMetricsFeature {
            story_ratio_percent: 20.0,
            score: 100.0,
        },
        story_placement: StoryPlacementFeature {
            position_ratio: 0.5,
            score: 100.0,
        },
    }
}

/// Audio stub: canned features or a canned failure, with optional delay
/// so progress checkpoints are observable
pub struct StubAudio {
    pub features: AudioFeatures,
    pub fail: Option<String>,
    pub delay: Duration,
}

impl Default for StubAudio {
    fn default() -> Self {
        Self {
            features: audio_features(),
            fail: None,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl AudioStage for StubAudio {
    async fn analyze(&self, _video_path: &Path) -> Result<AudioFeatures, StageError> {
        tokio::time::sleep(self.delay).await;
        match &self.fail {
            Some(msg) => Err(StageError::Api(500, msg.clone())),
            None => Ok(self.features.clone()),
        }
    }
}

pub struct StubVisual {
    pub features: VisualFeatures,
    pub fail: Option<String>,
    pub delay: Duration,
}

impl Default for StubVisual {
    fn default() -> Self {
        Self {
            features: visual_features(),
            fail: None,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl VisualStage for StubVisual {
    async fn analyze(&self, _video_path: &Path) -> Result<VisualFeatures, StageError> {
        tokio::time::sleep(self.delay).await;
        match &self.fail {
            Some(msg) => Err(StageError::Api(500, msg.clone())),
            None => Ok(self.features.clone()),
        }
    }
}

pub struct StubNarrative {
    pub features: NarrativeFeatures,
    pub fail: Option<String>,
    pub delay: Duration,
}

impl Default for StubNarrative {
    fn default() -> Self {
        Self {
            features: narrative_features(true),
            fail: None,
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl NarrativeStage for StubNarrative {
    async fn analyze(
        &self,
        _transcript: &str,
        _duration_seconds: f64,
    ) -> Result<NarrativeFeatures, StageError> {
        tokio::time::sleep(self.delay).await;
        match &self.fail {
            Some(msg) => Err(StageError::Api(500, msg.clone())),
            None => Ok(self.features.clone()),
        }
    }
}

/// Report stub: canned text, or Unavailable to exercise the template
/// fallback
pub struct StubReport {
    pub text: Option<String>,
}

impl Default for StubReport {
    fn default() -> Self {
        Self {
            text: Some("Stub coaching report".to_string()),
        }
    }
}

#[async_trait]
impl ReportStage for StubReport {
    async fn generate(
        &self,
        _scores: &ScoreSummary,
        _audio: &AudioFeatures,
        _visual: &VisualFeatures,
        _narrative: &NarrativeFeatures,
    ) -> Result<String, StageError> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(StageError::Unavailable("no report backend".to_string())),
        }
    }
}

/// All stubs on the happy path
pub fn stub_stages() -> Stages {
    Stages {
        audio: Arc::new(StubAudio::default()),
        visual: Arc::new(StubVisual::default()),
        narrative: Arc::new(StubNarrative::default()),
        report: Arc::new(StubReport::default()),
    }
}

/// Test configuration rooted in a fresh temp directory
pub fn test_config(root: &Path) -> AssessConfig {
    AssessConfig {
        storage_root: root.to_path_buf(),
        pipeline_workers: 1,
        queue_capacity: 4,
        stage_timeout_secs: 5,
        ..AssessConfig::default()
    }
}

/// Bootstrap the app against a temp storage root with the given stages
pub async fn test_state(stages: Stages) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(dir.path());
    let state = podium_assess::bootstrap(config, stages)
        .await
        .expect("Failed to bootstrap test app");
    (state, dir)
}

/// Poll the status row until the assessment reaches a terminal state,
/// collecting every observed progress value along the way
pub async fn poll_until_terminal(state: &AppState, assessment_id: Uuid) -> (AssessmentStatus, Vec<u8>) {
    let mut observed = Vec::new();

    for _ in 0..1000 {
        let status = podium_assess::db::assessments::load_status(&state.db, assessment_id)
            .await
            .expect("Failed to load status")
            .expect("Assessment row missing");

        observed.push(status.progress);

        if matches!(
            status.state,
            AssessmentState::Completed | AssessmentState::Failed
        ) {
            return (status, observed);
        }

        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    panic!("Assessment {} never reached a terminal state", assessment_id);
}

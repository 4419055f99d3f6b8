//! Analyzer feature bags
//!
//! Typed mirrors of the JSON returned by the three external analysis
//! services. Each bag is a fixed-shape record of named sub-scores in
//! [0, 100] plus the raw measurements behind them; the orchestrator never
//! looks past the named fields the scoring engine consumes.
//!
//! Fields default when an analyzer omits them (the narrative service
//! returns partial records when no story is detected).

use serde::{Deserialize, Serialize};

// ============================================================================
// Audio analysis
// ============================================================================

/// Audio analysis output: transcript plus eight scored speech parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Full speech-to-text transcript
    pub transcript: String,
    /// Audio duration in seconds
    pub duration_seconds: f64,
    /// Words-per-minute pacing
    pub speaking_rate: SpeakingRateFeature,
    /// Pitch level and modulation
    pub pitch: PitchFeature,
    /// Loudness and stability
    pub volume: VolumeFeature,
    /// Pause frequency
    pub pauses: PauseFeature,
    /// Filler word density
    pub fillers: FillerFeature,
    /// Sentence-length clarity
    pub clarity: ClarityFeature,
    /// Confidence vs. hedging language
    pub confidence: ConfidenceFeature,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakingRateFeature {
    /// Words per minute
    #[serde(default)]
    pub wpm: f64,
    #[serde(default)]
    pub score: f64,
    /// Analyzer-provided observation text
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitchFeature {
    /// Mean fundamental frequency in Hz
    #[serde(default)]
    pub mean_pitch_hz: f64,
    /// Pitch standard deviation in Hz (modulation)
    #[serde(default)]
    pub pitch_std: f64,
    /// Score for pitch level
    #[serde(default)]
    pub pitch_score: f64,
    /// Score for vocal variety
    #[serde(default)]
    pub variety_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeFeature {
    /// Mean volume in dB
    #[serde(default)]
    pub mean_volume_db: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PauseFeature {
    /// Pauses per minute
    #[serde(default)]
    pub pauses_per_minute: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FillerFeature {
    /// Filler words per 100 words
    #[serde(default)]
    pub fillers_per_100_words: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClarityFeature {
    /// Average sentence length in words
    #[serde(default)]
    pub avg_sentence_length: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfidenceFeature {
    /// Confident-phrase ratio in [0, 1]
    #[serde(default)]
    pub confidence_ratio: f64,
    #[serde(default)]
    pub score: f64,
}

// ============================================================================
// Visual analysis
// ============================================================================

/// Visual analysis output: six scored nonverbal parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisualFeatures {
    /// Upright posture tracking
    #[serde(default)]
    pub posture: PostureFeature,
    /// Body expansiveness (openness cues)
    #[serde(default)]
    pub expansiveness: ExpansivenessFeature,
    /// Camera eye contact estimation
    #[serde(default)]
    pub eye_contact: EyeContactFeature,
    /// Positive facial expression tracking
    #[serde(default)]
    pub expressions: ExpressionFeature,
    /// Hand gesture activity
    #[serde(default)]
    pub gestures: GestureFeature,
    /// Composite score of the opening seconds
    #[serde(default)]
    pub first_impression: FirstImpressionFeature,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostureFeature {
    /// Fraction of frames with upright posture, [0, 1]
    #[serde(default)]
    pub upright_ratio: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpansivenessFeature {
    /// Average body width ratio
    #[serde(default)]
    pub avg_expansiveness: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EyeContactFeature {
    /// Fraction of frames with camera eye contact, [0, 1]
    #[serde(default)]
    pub eye_contact_ratio: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpressionFeature {
    /// Fraction of frames with positive expression, [0, 1]
    #[serde(default)]
    pub positive_expression_ratio: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureFeature {
    /// Average gesture amplitude
    #[serde(default)]
    pub avg_gesture_amplitude: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirstImpressionFeature {
    #[serde(default)]
    pub score: f64,
}

// ============================================================================
// Narrative analysis
// ============================================================================

/// Narrative analysis output
///
/// When `has_story` is false the sub-records carry the analyzer's neutral
/// placeholders and the scoring engine produces an empty Storytelling
/// bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeFeatures {
    /// Whether a story segment was detected in the transcript
    #[serde(default)]
    pub has_story: bool,
    /// Number of detected story segments
    #[serde(default)]
    pub story_count: u32,
    /// Beginning-middle-end structure
    #[serde(default)]
    pub narrative_structure: NarrativeStructureFeature,
    /// Readability and connector flow
    #[serde(default)]
    pub cognitive_ease: CognitiveEaseFeature,
    /// Personal narrative markers
    #[serde(default)]
    pub self_disclosure: SelfDisclosureFeature,
    /// Specificity and imagery
    #[serde(default)]
    pub memorability: MemorabilityFeature,
    /// Story length relative to the talk
    #[serde(default)]
    pub story_metrics: StoryMetricsFeature,
    /// Story position within the talk
    #[serde(default)]
    pub story_placement: StoryPlacementFeature,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeStructureFeature {
    /// Setup, conflict and resolution all present
    #[serde(default)]
    pub structure_complete: bool,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CognitiveEaseFeature {
    /// Flesch reading-ease score
    #[serde(default)]
    pub flesch_score: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelfDisclosureFeature {
    /// First-person markers per 100 words
    #[serde(default)]
    pub first_person_ratio: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorabilityFeature {
    /// Specific-detail density as a percentage
    #[serde(default)]
    pub specificity_ratio: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryMetricsFeature {
    /// Estimated story share of the talk, percent
    #[serde(default)]
    pub story_ratio_percent: f64,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryPlacementFeature {
    /// Story start position as a fraction of the talk, [0, 1]
    #[serde(default)]
    pub position_ratio: f64,
    #[serde(default)]
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrative_bag_tolerates_partial_payload() {
        // The narrative service omits raw measurements when no story is found
        let json = r#"{
            "has_story": false,
            "story_count": 0,
            "narrative_structure": {"score": 0},
            "cognitive_ease": {"score": 50},
            "self_disclosure": {"score": 50},
            "memorability": {"score": 50},
            "story_metrics": {"score": 0},
            "story_placement": {"score": 50}
        }"#;
        let features: NarrativeFeatures = serde_json::from_str(json).unwrap();
        assert!(!features.has_story);
        assert_eq!(features.cognitive_ease.score, 50.0);
        assert!(!features.narrative_structure.structure_complete);
    }

    #[test]
    fn audio_bag_parses_full_payload() {
        let json = r#"{
            "transcript": "Hello team.",
            "duration_seconds": 120.5,
            "speaking_rate": {"wpm": 151.2, "score": 92.0, "description": "Speaking rate of 151.2 WPM"},
            "pitch": {"mean_pitch_hz": 128.4, "pitch_std": 24.1, "pitch_score": 100.0, "variety_score": 90.0},
            "volume": {"mean_volume_db": -14.2, "score": 100.0},
            "pauses": {"pauses_per_minute": 11.0, "score": 100.0},
            "fillers": {"fillers_per_100_words": 1.4, "score": 100.0},
            "clarity": {"avg_sentence_length": 16.3, "score": 100.0},
            "confidence": {"confidence_ratio": 0.72, "score": 100.0}
        }"#;
        let features: AudioFeatures = serde_json::from_str(json).unwrap();
        assert_eq!(features.transcript, "Hello team.");
        assert_eq!(features.pitch.pitch_std, 24.1);
    }
}

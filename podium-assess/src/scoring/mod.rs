//! Scoring aggregation engine
//!
//! Pure and deterministic: three feature bags in, parameter/bucket/overall
//! scores out. No I/O, no hidden state. Bucket scores are the arithmetic
//! mean of their parameter scores (computed at full precision, rounded to
//! one decimal at output); the overall score weights the three buckets at
//! 0.40/0.35/0.25. A presentation with no detected story gets a
//! Storytelling bucket of exactly 0 at full weight - the remaining
//! buckets are not reweighted.

use serde::{Deserialize, Serialize};

use crate::models::{AudioFeatures, BucketScore, NarrativeFeatures, ParameterScore, VisualFeatures};

/// Bucket names, fixed and ordered
pub const COMMUNICATION: &str = "Communication";
pub const APPEARANCE: &str = "Appearance & Nonverbal";
pub const STORYTELLING: &str = "Storytelling";

/// Bucket weights; an empty Storytelling bucket contributes 0, not an
/// excluded term
pub const COMMUNICATION_WEIGHT: f64 = 0.40;
pub const APPEARANCE_WEIGHT: f64 = 0.35;
pub const STORYTELLING_WEIGHT: f64 = 0.25;

/// Aggregated scoring output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Weighted overall score
    pub overall_score: f64,
    /// Communication bucket score
    pub communication_score: f64,
    /// Appearance & Nonverbal bucket score
    pub appearance_score: f64,
    /// Storytelling bucket score
    pub storytelling_score: f64,
    /// The three buckets in presentation order
    pub buckets: Vec<BucketScore>,
}

/// Main scoring pipeline
pub fn generate_scores(
    audio: &AudioFeatures,
    visual: &VisualFeatures,
    narrative: &NarrativeFeatures,
) -> ScoreSummary {
    let buckets = vec![
        bucket_score(COMMUNICATION, communication_parameters(audio)),
        bucket_score(APPEARANCE, appearance_parameters(visual)),
        bucket_score(STORYTELLING, storytelling_parameters(narrative)),
    ];

    let communication_score = buckets[0].score;
    let appearance_score = buckets[1].score;
    let storytelling_score = buckets[2].score;

    let overall_score = round1(
        communication_score * COMMUNICATION_WEIGHT
            + appearance_score * APPEARANCE_WEIGHT
            + storytelling_score * STORYTELLING_WEIGHT,
    );

    ScoreSummary {
        overall_score,
        communication_score,
        appearance_score,
        storytelling_score,
        buckets,
    }
}

/// Communication bucket: eight parameters from the audio stage
fn communication_parameters(audio: &AudioFeatures) -> Vec<ParameterScore> {
    vec![
        ParameterScore {
            name: "Speaking Rate".to_string(),
            score: audio.speaking_rate.score,
            raw_value: Some(audio.speaking_rate.wpm),
            unit: Some("WPM".to_string()),
            description: audio.speaking_rate.description.clone(),
        },
        ParameterScore {
            name: "Vocal Pitch".to_string(),
            score: audio.pitch.pitch_score,
            raw_value: Some(audio.pitch.mean_pitch_hz),
            unit: Some("Hz".to_string()),
            description: format!("Mean pitch of {} Hz", audio.pitch.mean_pitch_hz),
        },
        ParameterScore {
            name: "Vocal Variety".to_string(),
            score: audio.pitch.variety_score,
            raw_value: Some(audio.pitch.pitch_std),
            unit: Some("Hz std".to_string()),
            description: format!("Pitch variation: {} Hz", audio.pitch.pitch_std),
        },
        ParameterScore {
            name: "Volume Control".to_string(),
            score: audio.volume.score,
            raw_value: Some(audio.volume.mean_volume_db),
            unit: Some("dB".to_string()),
            description: format!("Average volume: {} dB", audio.volume.mean_volume_db),
        },
        ParameterScore {
            name: "Pauses".to_string(),
            score: audio.pauses.score,
            raw_value: Some(audio.pauses.pauses_per_minute),
            unit: Some("per min".to_string()),
            description: format!("{} pauses per minute", audio.pauses.pauses_per_minute),
        },
        ParameterScore {
            name: "Filler Words".to_string(),
            score: audio.fillers.score,
            raw_value: Some(audio.fillers.fillers_per_100_words),
            unit: Some("per 100 words".to_string()),
            description: format!(
                "{} fillers per 100 words",
                audio.fillers.fillers_per_100_words
            ),
        },
        ParameterScore {
            name: "Verbal Clarity".to_string(),
            score: audio.clarity.score,
            raw_value: Some(audio.clarity.avg_sentence_length),
            unit: Some("words/sentence".to_string()),
            description: format!(
                "Average sentence length: {} words",
                audio.clarity.avg_sentence_length
            ),
        },
        ParameterScore {
            name: "Confidence Language".to_string(),
            score: audio.confidence.score,
            raw_value: Some(audio.confidence.confidence_ratio),
            unit: Some("ratio".to_string()),
            description: format!(
                "Confidence ratio: {}",
                audio.confidence.confidence_ratio
            ),
        },
    ]
}

/// Appearance & Nonverbal bucket: six parameters from the visual stage
fn appearance_parameters(visual: &VisualFeatures) -> Vec<ParameterScore> {
    vec![
        ParameterScore {
            name: "Posture".to_string(),
            score: visual.posture.score,
            raw_value: Some(visual.posture.upright_ratio),
            unit: Some("ratio".to_string()),
            description: format!(
                "Upright posture: {:.0}% of time",
                visual.posture.upright_ratio * 100.0
            ),
        },
        ParameterScore {
            name: "Body Expansiveness".to_string(),
            score: visual.expansiveness.score,
            raw_value: Some(visual.expansiveness.avg_expansiveness),
            unit: Some("ratio".to_string()),
            description: format!(
                "Body width ratio: {}",
                visual.expansiveness.avg_expansiveness
            ),
        },
        ParameterScore {
            name: "Eye Contact".to_string(),
            score: visual.eye_contact.score,
            raw_value: Some(visual.eye_contact.eye_contact_ratio),
            unit: Some("ratio".to_string()),
            description: format!(
                "Eye contact: {:.0}% of time",
                visual.eye_contact.eye_contact_ratio * 100.0
            ),
        },
        ParameterScore {
            name: "Facial Expressions".to_string(),
            score: visual.expressions.score,
            raw_value: Some(visual.expressions.positive_expression_ratio),
            unit: Some("ratio".to_string()),
            description: format!(
                "Positive expressions: {:.0}%",
                visual.expressions.positive_expression_ratio * 100.0
            ),
        },
        ParameterScore {
            name: "Gestures".to_string(),
            score: visual.gestures.score,
            raw_value: Some(visual.gestures.avg_gesture_amplitude),
            unit: Some("amplitude".to_string()),
            description: format!(
                "Gesture amplitude: {}",
                visual.gestures.avg_gesture_amplitude
            ),
        },
        ParameterScore {
            name: "First Impression".to_string(),
            score: visual.first_impression.score,
            raw_value: Some(visual.first_impression.score),
            unit: Some("score".to_string()),
            description: "First 10 seconds composite score".to_string(),
        },
    ]
}

/// Storytelling bucket: six parameters from the narrative stage, but only
/// when a story was detected; otherwise the bucket has zero parameters
fn storytelling_parameters(narrative: &NarrativeFeatures) -> Vec<ParameterScore> {
    if !narrative.has_story {
        return Vec::new();
    }

    vec![
        ParameterScore {
            name: "Narrative Structure".to_string(),
            score: narrative.narrative_structure.score,
            raw_value: Some(if narrative.narrative_structure.structure_complete {
                1.0
            } else {
                0.0
            }),
            unit: Some("complete".to_string()),
            description: "Beginning-middle-end structure".to_string(),
        },
        ParameterScore {
            name: "Cognitive Ease".to_string(),
            score: narrative.cognitive_ease.score,
            raw_value: Some(narrative.cognitive_ease.flesch_score),
            unit: Some("Flesch score".to_string()),
            description: format!("Readability: {}", narrative.cognitive_ease.flesch_score),
        },
        ParameterScore {
            name: "Self-Disclosure".to_string(),
            score: narrative.self_disclosure.score,
            raw_value: Some(narrative.self_disclosure.first_person_ratio),
            unit: Some("%".to_string()),
            description: format!(
                "Personal narrative: {}%",
                narrative.self_disclosure.first_person_ratio
            ),
        },
        ParameterScore {
            name: "Memorability".to_string(),
            score: narrative.memorability.score,
            raw_value: Some(narrative.memorability.specificity_ratio),
            unit: Some("%".to_string()),
            description: format!(
                "Specificity: {}%",
                narrative.memorability.specificity_ratio
            ),
        },
        ParameterScore {
            name: "Story Pacing".to_string(),
            score: narrative.story_metrics.score,
            raw_value: Some(narrative.story_metrics.story_ratio_percent),
            unit: Some("%".to_string()),
            description: format!(
                "Story length: {}% of video",
                narrative.story_metrics.story_ratio_percent
            ),
        },
        ParameterScore {
            name: "Story Placement".to_string(),
            score: narrative.story_placement.score,
            raw_value: Some(narrative.story_placement.position_ratio),
            unit: Some("position".to_string()),
            description: format!(
                "Story position: {:.0}% through",
                narrative.story_placement.position_ratio * 100.0
            ),
        },
    ]
}

/// Mean of the parameter scores, rounded at output; an empty bucket
/// scores exactly 0
fn bucket_score(name: &str, parameters: Vec<ParameterScore>) -> BucketScore {
    let score = if parameters.is_empty() {
        0.0
    } else {
        round1(parameters.iter().map(|p| p.score).sum::<f64>() / parameters.len() as f64)
    };

    BucketScore {
        name: name.to_string(),
        score,
        parameters,
    }
}

/// Round to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

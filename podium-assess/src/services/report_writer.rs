//! Coaching report generation
//!
//! Builds the coaching prompt from the scores and feature bags and asks
//! an OpenAI-compatible chat API for the narrative. This is the one stage
//! whose failure is recoverable in place: the orchestrator falls back to
//! `template_report`, a deterministic report assembled from the same
//! inputs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ReportStage, StageError, USER_AGENT};
use crate::models::{AudioFeatures, NarrativeFeatures, VisualFeatures};
use crate::scoring::ScoreSummary;

/// Report LLM client
pub struct ReportWriter {
    http_client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ReportWriter {
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, StageError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StageError::Network(e.to_string()))?;

        if api_key.is_none() {
            tracing::warn!("Report API key not configured; reports will use the template fallback");
        }

        Ok(Self {
            http_client,
            api_url,
            api_key,
            model,
        })
    }

    /// Build the data context handed to the model
    fn build_context(
        scores: &ScoreSummary,
        audio: &AudioFeatures,
        visual: &VisualFeatures,
        narrative: &NarrativeFeatures,
    ) -> String {
        let mut context = format!(
            "\
OVERALL SCORE: {}/100

BUCKET SCORES:
- Communication: {}/100
- Appearance & Nonverbal: {}/100
- Storytelling: {}/100

COMMUNICATION PARAMETERS:
- Speaking Rate: {} WPM (Score: {})
- Vocal Pitch: {} Hz (Score: {})
- Vocal Variety: {} Hz std (Score: {})
- Volume: {} dB (Score: {})
- Pauses: {} per min (Score: {})
- Fillers: {} per 100 words (Score: {})
- Clarity: Avg {} words/sentence (Score: {})
- Confidence: Ratio {} (Score: {})

APPEARANCE & NONVERBAL PARAMETERS:
- Posture: {:.0}% upright (Score: {})
- Body Expansiveness: {} (Score: {})
- Eye Contact: {:.0}% (Score: {})
- Facial Expressions: {:.0}% positive (Score: {})
- Gestures: Amplitude {} (Score: {})
- First Impression: Score {}

STORYTELLING PARAMETERS:
",
            scores.overall_score,
            scores.communication_score,
            scores.appearance_score,
            scores.storytelling_score,
            audio.speaking_rate.wpm,
            audio.speaking_rate.score,
            audio.pitch.mean_pitch_hz,
            audio.pitch.pitch_score,
            audio.pitch.pitch_std,
            audio.pitch.variety_score,
            audio.volume.mean_volume_db,
            audio.volume.score,
            audio.pauses.pauses_per_minute,
            audio.pauses.score,
            audio.fillers.fillers_per_100_words,
            audio.fillers.score,
            audio.clarity.avg_sentence_length,
            audio.clarity.score,
            audio.confidence.confidence_ratio,
            audio.confidence.score,
            visual.posture.upright_ratio * 100.0,
            visual.posture.score,
            visual.expansiveness.avg_expansiveness,
            visual.expansiveness.score,
            visual.eye_contact.eye_contact_ratio * 100.0,
            visual.eye_contact.score,
            visual.expressions.positive_expression_ratio * 100.0,
            visual.expressions.score,
            visual.gestures.avg_gesture_amplitude,
            visual.gestures.score,
            visual.first_impression.score,
        );

        if narrative.has_story {
            context.push_str(&format!(
                "\
- Story Detected: Yes ({} segments)
- Narrative Structure: {} (Score: {})
- Cognitive Ease: Flesch {} (Score: {})
- Self-Disclosure: {}% first-person (Score: {})
- Memorability: {}% specific details (Score: {})
- Story Pacing: {}% of video (Score: {})
- Story Placement: {:.0}% through video (Score: {})
",
                narrative.story_count,
                if narrative.narrative_structure.structure_complete {
                    "Complete"
                } else {
                    "Incomplete"
                },
                narrative.narrative_structure.score,
                narrative.cognitive_ease.flesch_score,
                narrative.cognitive_ease.score,
                narrative.self_disclosure.first_person_ratio,
                narrative.self_disclosure.score,
                narrative.memorability.specificity_ratio,
                narrative.memorability.score,
                narrative.story_metrics.story_ratio_percent,
                narrative.story_metrics.score,
                narrative.story_placement.position_ratio * 100.0,
                narrative.story_placement.score,
            ));
        } else {
            context.push_str("- Story Detected: No clear story segment found\n");
        }

        context
    }

    fn build_prompt(context: &str) -> String {
        format!(
            "\
You are a presentation coach. Generate a professional, coaching-oriented \
assessment report based on the following data.

{context}

INSTRUCTIONS:
1. Start with a brief summary paragraph about overall presentation presence
2. Then create three sections: Communication, Appearance & Nonverbal, and Storytelling
3. For each parameter, provide:
   - What you observed (with concrete numbers)
   - One sentence of actionable coaching advice
4. Use encouraging, professional tone
5. Focus on growth opportunities, not criticism
6. Keep each parameter feedback to 2-3 sentences max
7. End with a \"Key Takeaways\" section

CRITICAL FORMATTING RULES:
- DO NOT use ### for bucket titles (Communication, Appearance & Nonverbal, Storytelling)
- DO NOT use * for bullet points
- DO NOT use ** for bold text
- Format bucket titles as: \"COMMUNICATION (Score: X/100)\" on its own line
- Format parameters as numbered points (1., 2., 3.)
- Format Key Takeaways section title as: \"KEY TAKEAWAYS\" on its own line

Generate the report now:"
        )
    }

    async fn chat(&self, prompt: String) -> Result<String, StageError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| StageError::Unavailable("report API key not configured".to_string()))?;

        let url = format!("{}/chat/completions", self.api_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an expert presentation coach providing constructive, \
                              actionable feedback."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 2000,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StageError::Api(status.as_u16(), error_text));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| StageError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| StageError::Parse("response contained no choices".to_string()))
    }

    /// Deterministic template report used when the LLM call fails
    ///
    /// Same sections and data as the generated report, assembled from
    /// fixed phrasing so repeated runs over the same input produce
    /// identical text.
    pub fn template_report(
        scores: &ScoreSummary,
        audio: &AudioFeatures,
        visual: &VisualFeatures,
        narrative: &NarrativeFeatures,
    ) -> String {
        let mut report = format!(
            "Your overall presentation score is {}/100. This assessment analyzes your \
             communication style, nonverbal behavior, and storytelling ability from a short \
             video sample.\n\n",
            scores.overall_score
        );

        report.push_str(&format!(
            "COMMUNICATION (Score: {}/100)\n\n\
             1. Speaking Rate: You spoke at {} words per minute. {}\n\n\
             2. Vocal Variety: Your pitch variation was {} Hz. {}\n\n\
             3. Pauses: You used {} pauses per minute. {}\n\n\
             4. Filler Words: You used {} filler words per 100 words. {}\n\n",
            scores.communication_score,
            audio.speaking_rate.wpm,
            if audio.speaking_rate.wpm >= 130.0 && audio.speaking_rate.wpm <= 170.0 {
                "This is within the ideal range for business communication."
            } else {
                "Consider adjusting your pace to 140-160 WPM for optimal clarity and engagement."
            },
            audio.pitch.pitch_std,
            if audio.pitch.variety_score >= 75.0 {
                "Good vocal variety keeps your audience engaged."
            } else {
                "Try varying your pitch more to emphasize key points and maintain interest."
            },
            audio.pauses.pauses_per_minute,
            if audio.pauses.score >= 75.0 {
                "Strategic pauses help your message land."
            } else {
                "Add more short pauses after important statements to let your audience absorb \
                 your message."
            },
            audio.fillers.fillers_per_100_words,
            if audio.fillers.score >= 80.0 {
                "Minimal fillers project confidence."
            } else {
                "Work on reducing 'um,' 'uh,' and 'like' to sound more polished and confident."
            },
        ));

        report.push_str(&format!(
            "APPEARANCE & NONVERBAL (Score: {}/100)\n\n\
             1. Posture: You maintained upright posture {:.0}% of the time. {}\n\n\
             2. Eye Contact: You maintained camera eye contact {:.0}% of the time. {}\n\n\
             3. Gestures: {}\n\n\
             4. First Impression: Your first 10 seconds scored {}/100. The opening moments are \
             critical - lead with strong posture, eye contact, and a confident tone.\n\n",
            scores.appearance_score,
            visual.posture.upright_ratio * 100.0,
            if visual.posture.score >= 75.0 {
                "Strong posture projects confidence and authority."
            } else {
                "Focus on keeping your shoulders back and spine straight to command more presence."
            },
            visual.eye_contact.eye_contact_ratio * 100.0,
            if visual.eye_contact.score >= 75.0 {
                "Good eye contact builds trust."
            } else {
                "Aim for 60-80% eye contact with the camera to create stronger connection with \
                 your audience."
            },
            if visual.gestures.score >= 75.0 {
                "Your hand gestures were well-balanced and purposeful."
            } else {
                "Use more deliberate hand gestures to emphasize key points and add dynamism to \
                 your delivery."
            },
            visual.first_impression.score,
        ));

        report.push_str(&format!(
            "STORYTELLING (Score: {}/100)\n\n",
            scores.storytelling_score
        ));

        if narrative.has_story {
            report.push_str(&format!(
                "1. Story Detection: You included {} story segment(s) in your video. {} Stories \
                 make your message memorable and help your audience connect emotionally with \
                 your leadership.\n\n\
                 2. Story Specificity: {}\n\n\
                 3. Personal Connection: {}\n",
                narrative.story_count,
                if narrative.narrative_structure.structure_complete {
                    "Your story had a clear beginning, middle, and end structure."
                } else {
                    "Strengthen your story with a clear setup, challenge, and resolution."
                },
                if narrative.memorability.score >= 75.0 {
                    "Great use of specific details and concrete examples."
                } else {
                    "Add more specific names, dates, and concrete details to make your stories \
                     more vivid and memorable."
                },
                if narrative.self_disclosure.score >= 75.0 {
                    "You effectively shared personal learning and reflection."
                } else {
                    "Share more about what you learned and how the experience shaped you to \
                     create deeper connection."
                },
            ));
        } else {
            report.push_str(
                "1. Story Detection: No clear story was detected in this video. Consider adding \
                 a brief personal or professional story to illustrate your points. Stories are \
                 powerful tools for presentation presence - they make you memorable, build \
                 emotional connection, and demonstrate your experience and learning.\n",
            );
        }

        let mut strengths = [
            ("Speaking Rate", audio.speaking_rate.score),
            ("Vocal Variety", audio.pitch.variety_score),
            ("Posture", visual.posture.score),
            ("Eye Contact", visual.eye_contact.score),
        ];
        strengths.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let top: Vec<&str> = strengths.iter().take(3).map(|s| s.0).collect();

        report.push_str(&format!(
            "\n\nKEY TAKEAWAYS\n\nYour strengths include: {}.\n\n\
             Focus areas for growth: Work on reducing filler words, maintaining consistent eye \
             contact, and incorporating compelling stories into your communication.",
            top.join(", ")
        ));

        report
    }
}

#[async_trait]
impl ReportStage for ReportWriter {
    async fn generate(
        &self,
        scores: &ScoreSummary,
        audio: &AudioFeatures,
        visual: &VisualFeatures,
        narrative: &NarrativeFeatures,
    ) -> Result<String, StageError> {
        let context = Self::build_context(scores, audio, visual, narrative);
        let prompt = Self::build_prompt(&context);

        let report_text = self.chat(prompt).await?;

        tracing::info!(chars = report_text.len(), "Coaching report generated");

        Ok(report_text)
    }
}

//! Scoring engine properties: determinism, weighting, empty-bucket
//! behavior and template report stability

mod helpers;

use helpers::{audio_features, narrative_features, visual_features};
use podium_assess::scoring::{
    self, APPEARANCE, APPEARANCE_WEIGHT, COMMUNICATION, COMMUNICATION_WEIGHT, STORYTELLING,
    STORYTELLING_WEIGHT,
};
use podium_assess::services::ReportWriter;

#[test]
fn weights_sum_to_one() {
    assert!((COMMUNICATION_WEIGHT + APPEARANCE_WEIGHT + STORYTELLING_WEIGHT - 1.0).abs() < 1e-12);
}

#[test]
fn fixed_inputs_always_yield_identical_scores() {
    let audio = audio_features();
    let visual = visual_features();
    let narrative = narrative_features(true);

    let first = scoring::generate_scores(&audio, &visual, &narrative);
    let second = scoring::generate_scores(&audio, &visual, &narrative);

    assert_eq!(first.overall_score, second.overall_score);
    assert_eq!(first.communication_score, second.communication_score);
    assert_eq!(first.appearance_score, second.appearance_score);
    assert_eq!(first.storytelling_score, second.storytelling_score);
    assert_eq!(first.buckets, second.buckets);
}

#[test]
fn bucket_scores_are_parameter_means() {
    let summary = scoring::generate_scores(
        &audio_features(),
        &visual_features(),
        &narrative_features(true),
    );

    for bucket in &summary.buckets {
        let mean =
            bucket.parameters.iter().map(|p| p.score).sum::<f64>() / bucket.parameters.len() as f64;
        assert_eq!(bucket.score, (mean * 10.0).round() / 10.0);
    }
}

#[test]
fn overall_is_the_weighted_bucket_sum() {
    let summary = scoring::generate_scores(
        &audio_features(),
        &visual_features(),
        &narrative_features(true),
    );

    let expected = summary.communication_score * COMMUNICATION_WEIGHT
        + summary.appearance_score * APPEARANCE_WEIGHT
        + summary.storytelling_score * STORYTELLING_WEIGHT;

    assert_eq!(summary.overall_score, (expected * 10.0).round() / 10.0);
}

#[test]
fn no_story_keeps_storytelling_term_at_zero_not_omitted() {
    let summary = scoring::generate_scores(
        &audio_features(),
        &visual_features(),
        &narrative_features(false),
    );

    assert_eq!(summary.storytelling_score, 0.0);

    let storytelling = summary
        .buckets
        .iter()
        .find(|b| b.name == STORYTELLING)
        .unwrap();
    assert_eq!(storytelling.score, 0.0);
    assert!(storytelling.parameters.is_empty());

    // The divisor is not reweighted: overall equals 0.40 C + 0.35 A
    let expected = summary.communication_score * COMMUNICATION_WEIGHT
        + summary.appearance_score * APPEARANCE_WEIGHT;
    assert_eq!(summary.overall_score, (expected * 10.0).round() / 10.0);
}

#[test]
fn buckets_keep_presentation_order_and_counts() {
    let summary = scoring::generate_scores(
        &audio_features(),
        &visual_features(),
        &narrative_features(true),
    );

    let names: Vec<&str> = summary.buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec![COMMUNICATION, APPEARANCE, STORYTELLING]);
    assert_eq!(summary.buckets[0].parameters.len(), 8);
    assert_eq!(summary.buckets[1].parameters.len(), 6);
    assert_eq!(summary.buckets[2].parameters.len(), 6);
}

#[test]
fn parameter_scores_carry_raw_values_and_units() {
    let summary = scoring::generate_scores(
        &audio_features(),
        &visual_features(),
        &narrative_features(true),
    );

    let speaking_rate = &summary.buckets[0].parameters[0];
    assert_eq!(speaking_rate.name, "Speaking Rate");
    assert_eq!(speaking_rate.raw_value, Some(150.0));
    assert_eq!(speaking_rate.unit.as_deref(), Some("WPM"));

    let eye_contact = summary.buckets[1]
        .parameters
        .iter()
        .find(|p| p.name == "Eye Contact")
        .unwrap();
    assert_eq!(eye_contact.raw_value, Some(0.7));
}

#[test]
fn template_report_is_deterministic_and_structured() {
    let audio = audio_features();
    let visual = visual_features();
    let narrative = narrative_features(true);
    let scores = scoring::generate_scores(&audio, &visual, &narrative);

    let first = ReportWriter::template_report(&scores, &audio, &visual, &narrative);
    let second = ReportWriter::template_report(&scores, &audio, &visual, &narrative);

    assert_eq!(first, second);
    assert!(first.contains(&format!("COMMUNICATION (Score: {}/100)", scores.communication_score)));
    assert!(first.contains(&format!(
        "APPEARANCE & NONVERBAL (Score: {}/100)",
        scores.appearance_score
    )));
    assert!(first.contains(&format!(
        "STORYTELLING (Score: {}/100)",
        scores.storytelling_score
    )));
    assert!(first.contains("KEY TAKEAWAYS"));
}

#[test]
fn template_report_handles_the_no_story_case() {
    let audio = audio_features();
    let visual = visual_features();
    let narrative = narrative_features(false);
    let scores = scoring::generate_scores(&audio, &visual, &narrative);

    let report = ReportWriter::template_report(&scores, &audio, &visual, &narrative);

    assert!(report.contains("No clear story was detected"));
    assert!(report.contains("STORYTELLING (Score: 0/100)"));
}

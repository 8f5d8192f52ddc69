use feynman::{
    Location, StuckSignal,
    validation::{UnderstandingLevel, ValidationVerdict},
};
use serde_json::Value;

#[test]
fn verdict_builder_defaults_collections() {
    let verdict = ValidationVerdict::builder()
        .passed(false)
        .understanding_level(UnderstandingLevel::Partial)
        .feedback("Getting there")
        .build();

    assert!(verdict.concepts_covered.is_empty());
    assert!(verdict.concepts_missed.is_empty());
    assert!(verdict.follow_up_questions.is_empty());
}

#[test]
fn verdict_serializes_camel_case() {
    let verdict = ValidationVerdict::builder()
        .passed(true)
        .understanding_level(UnderstandingLevel::NeedsWork)
        .feedback("ok")
        .follow_up_questions(vec!["Why?".to_string()])
        .build();

    let value: Value = serde_json::to_value(&verdict).expect("serialize verdict");
    assert_eq!(value["understandingLevel"], "needs_work");
    assert_eq!(value["followUpQuestions"][0], "Why?");
    assert!(value["conceptsCovered"].is_array());
}

#[test]
fn signal_builder_takes_optional_location() {
    let with = StuckSignal::builder()
        .reason_code("logic")
        .location(Location::new("a/b.py", 2))
        .build();
    let without = StuckSignal::builder().reason_code("logic").build();

    assert_eq!(with.location.as_ref().map(Location::file_name), Some("b.py"));
    assert!(without.location.is_none());
}

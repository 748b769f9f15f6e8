// ABOUTME: Integration tests for the progression engine's deterministic policy and model path
// ABOUTME: Verifies pain override, stimulus hold, range progression, and untrusted-model clamping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{beginner_catalog, init_test_logging, TestLlmProvider};
use gymmate_engine::catalog::{
    ExerciseCatalogProvider, ProgressionReferenceProvider, StaticExerciseCatalog,
    StaticProgressionReference,
};
use gymmate_engine::errors::ErrorCode;
use gymmate_engine::models::{ExperienceTier, FeedbackSignal};
use gymmate_engine::progression::{FeedbackContext, ProgressionEngine};
use serde_json::json;

fn reference() -> StaticProgressionReference {
    StaticProgressionReference::new(vec![json!({
        "rule": "progress reps within the prescribed range before touching the load",
        "increment_kg": 2.5
    })])
}

fn ctx<'a>(
    exercise: &'a str,
    volume: &'a str,
    weight: f64,
    signal: FeedbackSignal,
) -> FeedbackContext<'a> {
    FeedbackContext {
        exercise,
        prior_volume: volume,
        prior_intensity: "RIR 1-2",
        prior_weight: weight,
        signal,
        tier: ExperienceTier::Beginner,
    }
}

async fn catalog_entries() -> Vec<gymmate_engine::models::ExerciseCatalogEntry> {
    beginner_catalog()
        .fetch_by_difficulty(ExperienceTier::Beginner)
        .await
        .unwrap()
}

// ----------------------------------------------------------------------------
// Deterministic policy properties
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_determinism_bit_identical_recommendations() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let signal = FeedbackSignal::new(true, 1, 3).unwrap();
    let context = ctx("Bench Press", "3x10-15", 20.0, signal);
    let reference = reference().fetch_all().await.unwrap();
    let catalog = catalog_entries().await;

    let first = engine.recommend(&context, &reference, &catalog).unwrap();
    let second = engine.recommend(&context, &reference, &catalog).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.volume, "3x12");
    assert!((first.weight - 20.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_pain_override_always_substitutes() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let reference = reference().fetch_all().await.unwrap();
    let catalog = catalog_entries().await;

    for achieved in [true, false] {
        let signal = FeedbackSignal::new(achieved, 5, 3).unwrap();
        let rec = engine
            .recommend(&ctx("Bench Press", "5x5", 80.0, signal), &reference, &catalog)
            .unwrap();
        assert_ne!(rec.suggested, rec.original, "achieved = {achieved}");
        // The substitute starts over at its entry range
        assert_eq!(rec.volume, "3x8-12");
    }
}

#[tokio::test]
async fn test_no_progress_without_stimulus() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let signal = FeedbackSignal::new(true, 0, 0).unwrap();
    let reference = reference().fetch_all().await.unwrap();
    let catalog = catalog_entries().await;

    let rec = engine
        .recommend(&ctx("Squat", "3x10", 100.0, signal), &reference, &catalog)
        .unwrap();

    assert_eq!(rec.suggested, "Squat");
    assert_eq!(rec.volume, "3x10");
    assert!((rec.weight - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_volume_notation_is_always_set_by_rep() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let reference = reference().fetch_all().await.unwrap();
    let catalog = catalog_entries().await;

    let cases = [
        FeedbackSignal::new(true, 1, 3).unwrap(),
        FeedbackSignal::new(false, 0, 2).unwrap(),
        FeedbackSignal::new(true, 5, 0).unwrap(),
    ];
    for signal in cases {
        let rec = engine
            .recommend(&ctx("Bench Press", "3x10-15", 40.0, signal), &reference, &catalog)
            .unwrap();
        assert!(
            gymmate_engine::models::Volume::parse(&rec.volume).is_some(),
            "'{}' is not set-by-rep notation",
            rec.volume
        );
    }
}

// ----------------------------------------------------------------------------
// Model-assisted path
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_model_recommendation_is_recovered_and_returned() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let signal = FeedbackSignal::new(true, 1, 3).unwrap();
    let context = ctx("Bench Press", "3x10-15", 50.0, signal);

    let reply = "```json\n{\"recommendation\": {\"original\": \"Bench Press\", \"suggested\": \"Bench Press\", \"weight\": 50, \"volume\": \"3x12\", \"rir\": \"1-2\"}}\n```";
    let provider = TestLlmProvider::with_response(reply);

    let rec = engine
        .recommend_with_model(&context, &provider, &reference(), &beginner_catalog())
        .await
        .unwrap();

    assert_eq!(rec.suggested, "Bench Press");
    assert_eq!(rec.volume, "3x12");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_model_garbage_surfaces_as_error_not_fallback() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let signal = FeedbackSignal::new(true, 1, 3).unwrap();
    let context = ctx("Bench Press", "3x10-15", 50.0, signal);

    let provider = TestLlmProvider::with_response("just keep doing what you're doing, champ");
    let result = engine
        .recommend_with_model(&context, &provider, &reference(), &beginner_catalog())
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.code, ErrorCode::RecoveryFailed);
}

#[tokio::test]
async fn test_model_failure_surfaces_directly() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let signal = FeedbackSignal::new(true, 1, 3).unwrap();
    let context = ctx("Bench Press", "3x10-15", 50.0, signal);

    let provider = TestLlmProvider::failing("api key revoked");
    let result = engine
        .recommend_with_model(&context, &provider, &reference(), &beginner_catalog())
        .await;

    assert_eq!(result.unwrap_err().code, ErrorCode::ModelUnavailable);
}

#[tokio::test]
async fn test_missing_reference_data_fails_before_model_call() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let signal = FeedbackSignal::new(true, 1, 3).unwrap();
    let context = ctx("Bench Press", "3x10-15", 50.0, signal);

    let provider = TestLlmProvider::with_response("unused");
    let empty_reference = StaticProgressionReference::default();

    let result = engine
        .recommend_with_model(&context, &provider, &empty_reference, &beginner_catalog())
        .await;

    assert_eq!(result.unwrap_err().code, ErrorCode::ReferenceDataUnavailable);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_empty_catalog_is_fatal_for_recommendations() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    let signal = FeedbackSignal::new(true, 1, 3).unwrap();
    let context = ctx("Bench Press", "3x10-15", 50.0, signal);

    let provider = TestLlmProvider::with_response("unused");
    let empty_catalog = StaticExerciseCatalog::default();

    let result = engine
        .recommend_with_model(&context, &provider, &reference(), &empty_catalog)
        .await;

    assert_eq!(result.unwrap_err().code, ErrorCode::ReferenceDataUnavailable);
}

#[tokio::test]
async fn test_unsanctioned_model_substitution_is_overridden() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    // Mild session: the policy keeps the exercise
    let signal = FeedbackSignal::new(true, 1, 3).unwrap();
    let context = ctx("Bench Press", "3x10-15", 50.0, signal);

    let reply = r#"{"recommendation": {"original": "Bench Press", "suggested": "Cable Crossover", "weight": 50, "volume": "3x8-12", "rir": "1-2"}}"#;
    let provider = TestLlmProvider::with_response(reply);

    let rec = engine
        .recommend_with_model(&context, &provider, &reference(), &beginner_catalog())
        .await
        .unwrap();

    assert_eq!(rec.suggested, "Bench Press", "policy does not sanction a swap");
}

#[tokio::test]
async fn test_unsanctioned_weight_increase_is_reverted() {
    init_test_logging();
    let engine = ProgressionEngine::default();
    // Zero pump: the policy holds the load
    let signal = FeedbackSignal::new(true, 0, 0).unwrap();
    let context = ctx("Squat", "3x10", 100.0, signal);

    let reply = r#"{"recommendation": {"original": "Squat", "suggested": "Squat", "weight": 102.5, "volume": "3x10", "rir": "1-2"}}"#;
    let provider = TestLlmProvider::with_response(reply);

    let rec = engine
        .recommend_with_model(&context, &provider, &reference(), &beginner_catalog())
        .await
        .unwrap();

    assert!((rec.weight - 100.0).abs() < f64::EPSILON);
}

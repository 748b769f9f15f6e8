// ABOUTME: Integration tests for the program assembler with a scripted mock provider
// ABOUTME: Covers the day-count contract, fallback routing, sanitation, and shortfall reporting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::time::Duration;

use common::{beginner_catalog, init_test_logging, program_json, TestLlmProvider};
use gymmate_engine::catalog::StaticExerciseCatalog;
use gymmate_engine::config::EngineConfig;
use gymmate_engine::models::{ExperienceTier, Gender, Goal, ProgramRequest, ProgramSource};
use gymmate_engine::program::ProgramAssembler;

fn request(tier: ExperienceTier, days: u8) -> ProgramRequest {
    ProgramRequest::new(Gender::Male, tier, Goal::MuscleGain, days, None).unwrap()
}

// ----------------------------------------------------------------------------
// Model path
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_valid_model_output_is_returned_as_model_source() {
    init_test_logging();
    let provider = TestLlmProvider::with_response(program_json(&[
        ("Day 1", "Squat"),
        ("Day 2", "Bench Press"),
        ("Day 3", "Bent-over Row"),
        ("Day 4", "Leg Press"),
    ]));
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 4), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Model);
    assert_eq!(result.program.day_count(), 4);
    assert!(result.error.is_none());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_fenced_model_output_is_recovered() {
    init_test_logging();
    let wrapped = format!(
        "```json\n{}\n```",
        program_json(&[("Day 1", "Squat"), ("Day 2", "Bench Press")])
    );
    let provider = TestLlmProvider::with_response(wrapped);
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 2), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Model);
    assert_eq!(result.program.day_count(), 2);
}

#[tokio::test]
async fn test_unknown_exercises_are_dropped_but_day_survives() {
    init_test_logging();
    // One day mixes a catalog exercise with a hallucinated one
    let doc = serde_json::json!({
        "program": {
            "Day 1": [
                {"name": "Squat", "sets": 3, "reps": "8-12", "rir": "2-3"},
                {"name": "Cossack Flow", "sets": 3, "reps": "8-12", "rir": "2-3"}
            ],
            "Day 2": [
                {"name": "Bench Press", "sets": 3, "reps": "8-12", "rir": "2-3"}
            ]
        }
    })
    .to_string();
    let provider = TestLlmProvider::with_response(doc);
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 2), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Model);
    assert_eq!(result.program.day_count(), 2);
    assert_eq!(result.program.exercise_count(), 2);
}

#[tokio::test]
async fn test_day_emptied_by_sanitation_routes_to_fallback() {
    init_test_logging();
    // Second day consists entirely of exercises outside the catalog
    let provider = TestLlmProvider::with_response(program_json(&[
        ("Day 1", "Squat"),
        ("Day 2", "Underwater Basket Press"),
    ]));
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 2), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Fallback);
    assert_eq!(result.program.day_count(), 2);
}

// ----------------------------------------------------------------------------
// Day-count contract
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_three_day_output_for_four_day_request_is_discarded() {
    init_test_logging();
    // End-to-end scenario: the model defaults to 3 days despite the 4-day
    // instruction. The output is structurally valid but violates the
    // contract, so the beginner fallback is selected instead, and the
    // beginner catalog authors only 3 days, which is reported as an error.
    let provider = TestLlmProvider::with_response(program_json(&[
        ("Day 1", "Squat"),
        ("Day 2", "Bench Press"),
        ("Day 3", "Bent-over Row"),
    ]));
    let req =
        ProgramRequest::new(Gender::Female, ExperienceTier::Beginner, Goal::FatLoss, 4, None)
            .unwrap();
    let assembler = ProgramAssembler::default();

    let result = assembler.generate(&req, &provider, &beginner_catalog()).await;

    assert_eq!(result.source, ProgramSource::Fallback);
    assert_eq!(result.program.day_count(), 3);
    let error = result.error.expect("shortfall must be reported");
    assert!(error.contains("4"));
    assert!(error.contains("3"));
}

#[tokio::test]
async fn test_excess_day_output_is_discarded_too() {
    init_test_logging();
    let provider = TestLlmProvider::with_response(program_json(&[
        ("Day 1", "Squat"),
        ("Day 2", "Bench Press"),
        ("Day 3", "Bent-over Row"),
    ]));
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 2), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Fallback);
    assert_eq!(result.program.day_count(), 2);
    assert!(result.error.is_none());
}

// ----------------------------------------------------------------------------
// Failure routing into the fallback catalog
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_model_failure_selects_fallback() {
    init_test_logging();
    let provider = TestLlmProvider::failing("connection refused");
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 3), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Fallback);
    assert_eq!(result.program.day_count(), 3);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_unparsable_output_selects_fallback() {
    init_test_logging();
    let provider =
        TestLlmProvider::with_response("Sure! Here is a great plan: lift heavy, rest well.");
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 3), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Fallback);
    assert_eq!(result.program.day_count(), 3);
}

#[tokio::test]
async fn test_valid_json_missing_program_key_selects_fallback() {
    init_test_logging();
    let provider = TestLlmProvider::with_response(r#"{"plan": "three days of lifting"}"#);
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 3), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Fallback);
}

#[tokio::test]
async fn test_timeout_routes_into_fallback() {
    init_test_logging();
    let provider = TestLlmProvider::hanging();
    let config = EngineConfig {
        request_timeout: Duration::from_millis(50),
        ..EngineConfig::default()
    };
    let assembler = ProgramAssembler::new(config);

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 3), &provider, &beginner_catalog())
        .await;

    assert_eq!(result.source, ProgramSource::Fallback);
    assert_eq!(result.program.day_count(), 3);
}

#[tokio::test]
async fn test_empty_catalog_forces_fallback_without_model_call() {
    init_test_logging();
    let provider = TestLlmProvider::with_response(program_json(&[("Day 1", "Squat")]));
    let empty_catalog = StaticExerciseCatalog::default();
    let assembler = ProgramAssembler::default();

    let result = assembler
        .generate(&request(ExperienceTier::Beginner, 1), &provider, &empty_catalog)
        .await;

    assert_eq!(result.source, ProgramSource::Fallback);
    assert_eq!(result.program.day_count(), 1);
    assert_eq!(provider.call_count(), 0, "no data means no model call");
}

// ----------------------------------------------------------------------------
// Fallback selection per tier
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_fallback_day_count_is_min_of_request_and_authored() {
    init_test_logging();
    let assembler = ProgramAssembler::default();

    for (tier, requested, expected, shortfall) in [
        (ExperienceTier::Beginner, 2_u8, 2_usize, false),
        (ExperienceTier::Beginner, 6, 3, true),
        (ExperienceTier::Intermediate, 4, 4, false),
        (ExperienceTier::Intermediate, 5, 4, true),
        (ExperienceTier::Advanced, 5, 5, false),
        (ExperienceTier::Advanced, 7, 5, true),
    ] {
        let provider = TestLlmProvider::failing("down for maintenance");
        let result = assembler
            .generate(&request(tier, requested), &provider, &beginner_catalog())
            .await;

        assert_eq!(result.source, ProgramSource::Fallback);
        assert_eq!(
            result.program.day_count(),
            expected,
            "tier {tier}, requested {requested}"
        );
        assert_eq!(result.error.is_some(), shortfall, "tier {tier}, requested {requested}");
    }
}

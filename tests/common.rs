// ABOUTME: Shared test utilities and the scripted mock LLM provider
// ABOUTME: Provides canned-response, failing, and hanging provider modes for integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

//! Shared test utilities for `gymmate_engine`
//!
//! This module provides the mock provider and catalog fixtures used across
//! integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use gymmate_engine::catalog::StaticExerciseCatalog;
use gymmate_engine::errors::AppError;
use gymmate_engine::llm::{
    ChatRequest, ChatResponse, LlmCapabilities, LlmProvider,
};
use gymmate_engine::models::{ExerciseCatalogEntry, ExperienceTier};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber_init();
    });
}

fn tracing_subscriber_init() -> anyhow::Result<()> {
    gymmate_engine::logging::LoggingConfig {
        level: std::env::var("TEST_LOG").unwrap_or_else(|_| "warn".into()),
        ..gymmate_engine::logging::LoggingConfig::default()
    }
    .init()
}

/// How the scripted provider behaves when invoked
enum Mode {
    /// Return the canned content
    Reply(String),
    /// Fail with `ModelUnavailable`
    Fail(String),
    /// Never respond (exercises the caller's timeout)
    Hang,
}

/// Scripted LLM provider for integration tests
pub struct TestLlmProvider {
    mode: Mode,
    calls: AtomicUsize,
}

impl TestLlmProvider {
    /// Provider that replies with fixed content
    pub fn with_response(content: impl Into<String>) -> Self {
        Self {
            mode: Mode::Reply(content.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider whose every call fails as unavailable
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            mode: Mode::Fail(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider that hangs until the caller's timeout fires
    pub fn hanging() -> Self {
        Self {
            mode: Mode::Hang,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completed `complete` invocations
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for TestLlmProvider {
    fn name(&self) -> &'static str {
        "test"
    }

    fn display_name(&self) -> &'static str {
        "Scripted Test Provider"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::text_only()
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    fn available_models(&self) -> &'static [&'static str] {
        &["scripted-1"]
    }

    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            Mode::Reply(content) => Ok(ChatResponse {
                content: content.clone(),
                model: "scripted-1".to_owned(),
                usage: None,
                finish_reason: Some("stop".to_owned()),
            }),
            Mode::Fail(message) => Err(AppError::model_unavailable(message.clone())),
            Mode::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AppError::model_unavailable("unreachable"))
            }
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(matches!(self.mode, Mode::Reply(_)))
    }
}

/// Beginner-tier catalog whose names match the fixture programs
pub fn beginner_catalog() -> StaticExerciseCatalog {
    StaticExerciseCatalog::new(vec![
        ExerciseCatalogEntry::new("Squat", ExperienceTier::Beginner)
            .with_attribute("movement_pattern", json!("squat"))
            .with_attribute("entry_volume", json!("3x8-12")),
        ExerciseCatalogEntry::new("Leg Press", ExperienceTier::Beginner)
            .with_attribute("movement_pattern", json!("squat"))
            .with_attribute("entry_volume", json!("3x12-15")),
        ExerciseCatalogEntry::new("Bench Press", ExperienceTier::Beginner)
            .with_attribute("movement_pattern", json!("horizontal_press"))
            .with_attribute("entry_volume", json!("3x8-12")),
        ExerciseCatalogEntry::new("Dumbbell Press", ExperienceTier::Beginner)
            .with_attribute("movement_pattern", json!("horizontal_press"))
            .with_attribute("entry_volume", json!("3x8-12")),
        ExerciseCatalogEntry::new("Bent-over Row", ExperienceTier::Beginner)
            .with_attribute("movement_pattern", json!("horizontal_pull"))
            .with_attribute("entry_volume", json!("3x8-12")),
        ExerciseCatalogEntry::new("Seated Row", ExperienceTier::Beginner)
            .with_attribute("movement_pattern", json!("horizontal_pull"))
            .with_attribute("entry_volume", json!("3x8-12")),
    ])
}

/// Build a `{"program": {...}}` document with one exercise per given day
pub fn program_json(days: &[(&str, &str)]) -> String {
    let mut program = serde_json::Map::new();
    for (label, exercise) in days {
        program.insert(
            (*label).to_owned(),
            json!([{"name": exercise, "sets": 3, "reps": "8-12", "rir": "2-3"}]),
        );
    }
    json!({ "program": program }).to_string()
}

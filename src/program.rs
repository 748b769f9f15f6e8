// ABOUTME: Program assembler orchestrating prompt, model call, recovery, and fallback
// ABOUTME: Treats the model as untrusted and validates the day-count contract post hoc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Program Assembler
//!
//! Orchestrates one program generation request:
//! prompt → model → recovery → validation, with the static fallback catalog
//! behind every failure path.
//!
//! The assembler never trusts prompt wording to enforce structure. The
//! day-count equality check runs after recovery succeeds, because a
//! parseable program with the wrong number of days still violates the
//! contract with the caller; it is discarded exactly like unparsable
//! output.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::catalog::ExerciseCatalogProvider;
use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::fallback;
use crate::llm::{invoke_with_timeout, prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::{
    ExerciseCatalogEntry, GeneratedProgram, ProgramRequest, ProgramResult, ProgramSource,
};
use crate::recovery::{self, ExpectedSchema};

/// Decoded top-level shape of a recovered program document
#[derive(Debug, serde::Deserialize)]
struct ProgramEnvelope {
    program: GeneratedProgram,
}

/// Orchestrates program generation with a guaranteed structural result
#[derive(Debug, Clone)]
pub struct ProgramAssembler {
    config: EngineConfig,
}

impl Default for ProgramAssembler {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ProgramAssembler {
    /// Create an assembler with the given configuration
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Generate a program for the request.
    ///
    /// Never returns an error: every generation failure routes into the
    /// fallback catalog, and `ProgramResult.error` is set only when the
    /// fallback itself cannot cover the requested day count.
    pub async fn generate(
        &self,
        request: &ProgramRequest,
        provider: &dyn LlmProvider,
        catalog: &dyn ExerciseCatalogProvider,
    ) -> ProgramResult {
        // Catalog lookup fails soft: no data means no generation, not an error
        let entries = match catalog.fetch_by_difficulty(request.experience).await {
            Ok(entries) => entries,
            Err(error) => {
                warn!(%error, tier = %request.experience, "catalog fetch failed, forcing fallback");
                Vec::new()
            }
        };

        match self.generate_from_model(request, provider, &entries).await {
            Ok(program) => {
                info!(
                    days = program.day_count(),
                    exercises = program.exercise_count(),
                    "model produced a structurally valid program"
                );
                ProgramResult {
                    program,
                    source: ProgramSource::Model,
                    error: None,
                    generated_at: chrono::Utc::now(),
                }
            }
            Err(error) => {
                info!(%error, "generation failed, selecting fallback program");
                self.build_fallback(request)
            }
        }
    }

    /// Run the model path: prompt, invoke, recover, sanitize, validate
    async fn generate_from_model(
        &self,
        request: &ProgramRequest,
        provider: &dyn LlmProvider,
        entries: &[ExerciseCatalogEntry],
    ) -> Result<GeneratedProgram, AppError> {
        if entries.is_empty() {
            return Err(AppError::reference_data_unavailable(format!(
                "exercise catalog subset for tier '{}'",
                request.experience
            )));
        }

        let prompt = prompts::program_prompt(request, entries);
        let chat = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_model_override(self.config.model.as_deref())
            .with_temperature(0.7);

        let response = invoke_with_timeout(provider, &chat, self.config.request_timeout).await?;
        debug!(model = %response.model, "model responded, recovering program document");

        let document = recovery::recover(&response.content, ExpectedSchema::Program)?;
        let envelope: ProgramEnvelope = serde_json::from_str(&document).map_err(|e| {
            AppError::recovery_failed(format!("recovered document does not decode: {e}"))
        })?;
        let mut program = envelope.program;

        // Catalog membership is the only semantic check the engine performs
        let known: HashSet<String> = entries
            .iter()
            .map(|entry| entry.name.to_lowercase())
            .collect();
        let days_before = program.day_count();
        program.sanitize_exercises(|prescription| {
            let keep = known.contains(&prescription.name.to_lowercase());
            if !keep {
                debug!(exercise = %prescription.name, "dropping exercise not present in catalog");
            }
            keep
        });
        if program.day_count() != days_before {
            return Err(AppError::recovery_failed(
                "sanitation left at least one generated day without exercises",
            ));
        }

        let expected = usize::from(request.workout_days);
        if program.day_count() != expected {
            return Err(AppError::day_count_mismatch(expected, program.day_count()));
        }

        Ok(program)
    }

    /// Select the tier fallback, truncated to the requested day count
    fn build_fallback(&self, request: &ProgramRequest) -> ProgramResult {
        let requested = usize::from(request.workout_days);
        let program = fallback::select(request.experience, requested);

        let error = if program.is_empty() {
            Some(
                AppError::fallback_shortfall(requested, 0)
                    .to_string(),
            )
        } else if program.day_count() < requested {
            Some(
                AppError::fallback_shortfall(requested, fallback::authored_len(request.experience))
                    .to_string(),
            )
        } else {
            None
        };

        if let Some(message) = &error {
            warn!(%message, tier = %request.experience, "fallback cannot fully cover the request");
        }

        ProgramResult {
            program,
            source: ProgramSource::Fallback,
            error,
            generated_at: chrono::Utc::now(),
        }
    }
}

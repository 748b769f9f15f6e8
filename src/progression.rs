// ABOUTME: Feedback-to-recommendation progression engine with deterministic decision rules
// ABOUTME: Volume progresses before load; joint pain overrides success; no stimulus means hold
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Progression Engine
//!
//! Turns one exercise's prior prescription plus a post-workout feedback
//! signal into a single adjustment recommendation.
//!
//! The decision policy is deterministic and lives in [`ProgressionEngine::recommend`]:
//!
//! - Not achieved: never increase load. Pain at/above the threshold swaps
//!   the exercise; otherwise everything holds.
//! - Achieved with pain at/above the threshold: swap anyway; pain
//!   overrides success.
//! - Achieved, pain below threshold: a pump rating of zero holds everything
//!   regardless of range position; otherwise reps progress within the
//!   prescribed range before any load change, and a topped-out range moves
//!   the load by one increment and resets reps to the range floor.
//!
//! [`ProgressionEngine::recommend_with_model`] consults the generative
//! model with the same recovery discipline as program generation, then
//! clamps the model's output through the deterministic policy, so an
//! unsanctioned substitution or load increase never survives. There is no
//! fallback table for recommendations: a wrong progression silently
//! corrupts the user's training history, so reference-data and model
//! failures surface as errors instead.

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::{ExerciseCatalogProvider, ProgressionReferenceProvider};
use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::llm::{invoke_with_timeout, prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::{
    ExerciseCatalogEntry, ExperienceTier, FeedbackSignal, ProgressionRecommendation, Volume,
};
use crate::recovery::{self, ExpectedSchema};

/// Intensity marker a fresh (entry-level) prescription starts at
const ENTRY_INTENSITY: &str = "2-3";

/// Prior prescription plus feedback for one exercise
#[derive(Debug, Clone)]
pub struct FeedbackContext<'a> {
    pub exercise: &'a str,
    pub prior_volume: &'a str,
    pub prior_intensity: &'a str,
    pub prior_weight: f64,
    pub signal: FeedbackSignal,
    pub tier: ExperienceTier,
}

/// Decoded top-level shape of a recovered recommendation document
#[derive(Debug, Deserialize)]
struct RecommendationEnvelope {
    recommendation: ProgressionRecommendation,
}

/// Deterministic progression engine
#[derive(Debug, Clone)]
pub struct ProgressionEngine {
    config: EngineConfig,
}

impl Default for ProgressionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl ProgressionEngine {
    /// Create an engine with the given configuration
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Produce one recommendation from the deterministic decision policy.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceDataUnavailable` when the progression reference or
    /// the catalog is empty, and `InvalidInput` when the prior volume is
    /// not set×rep notation. There is deliberately no fallback.
    pub fn recommend(
        &self,
        ctx: &FeedbackContext<'_>,
        progression_reference: &[serde_json::Value],
        catalog: &[ExerciseCatalogEntry],
    ) -> Result<ProgressionRecommendation, AppError> {
        if progression_reference.is_empty() {
            return Err(AppError::reference_data_unavailable(
                "progression reference data",
            ));
        }
        if catalog.is_empty() {
            return Err(AppError::reference_data_unavailable("exercise catalog"));
        }

        let signal = ctx.signal;
        let tuning = self.config.tuning;

        // Pain overrides success: substitution applies whether or not the
        // prescription was completed
        if signal.joint_pain >= tuning.pain_substitution_threshold {
            debug!(
                exercise = %ctx.exercise,
                joint_pain = signal.joint_pain,
                "pain threshold reached, selecting substitution"
            );
            return Ok(self.substitute(ctx, catalog));
        }

        if !signal.achieved {
            // Incomplete without notable pain: hold everything. The
            // unchanged weight is the deload signal for the next session.
            return Ok(Self::hold(ctx));
        }

        // Completed as prescribed, pain below threshold
        if signal.pump_rating == 0 {
            // Low subjective stimulus overrides mechanical completion
            debug!(exercise = %ctx.exercise, "no perceived stimulus, holding prescription");
            return Ok(Self::hold(ctx));
        }

        let Some(prior) = Volume::parse(ctx.prior_volume) else {
            return Err(AppError::invalid_input(format!(
                "prior volume '{}' is not set-by-rep notation",
                ctx.prior_volume
            )));
        };

        Ok(self.progress(ctx, prior, catalog))
    }

    /// Keep exercise, volume, and weight unchanged
    fn hold(ctx: &FeedbackContext<'_>) -> ProgressionRecommendation {
        ProgressionRecommendation {
            original: ctx.exercise.to_owned(),
            suggested: ctx.exercise.to_owned(),
            weight: ctx.prior_weight,
            volume: Volume::parse(ctx.prior_volume)
                .map_or_else(|| ctx.prior_volume.to_owned(), |v| v.to_string()),
            intensity: ctx.prior_intensity.to_owned(),
        }
    }

    /// Progress reps within the prescribed range before touching the load
    fn progress(
        &self,
        ctx: &FeedbackContext<'_>,
        prior: Volume,
        catalog: &[ExerciseCatalogEntry],
    ) -> ProgressionRecommendation {
        // A range prescription carries its own bounds and the performed reps
        // sit at the floor; a fixed prescription is positioned inside the
        // exercise's entry range.
        let (range, performed) = if prior.is_range() {
            (prior, prior.rep_low)
        } else {
            let mut range = Self::entry_volume_for(ctx.exercise, ctx.tier, catalog);
            range.sets = prior.sets;
            (range, prior.rep_low)
        };

        if performed >= range.top() {
            // Range topped out: one load increment, reps back to the floor
            let weight = ctx.prior_weight + self.config.tuning.weight_increment;
            return ProgressionRecommendation {
                original: ctx.exercise.to_owned(),
                suggested: ctx.exercise.to_owned(),
                weight,
                volume: range.at_reps(range.rep_low).to_string(),
                intensity: ctx.prior_intensity.to_owned(),
            };
        }

        let next_reps = if performed <= range.midpoint() {
            range.midpoint()
        } else {
            range.top()
        };

        ProgressionRecommendation {
            original: ctx.exercise.to_owned(),
            suggested: ctx.exercise.to_owned(),
            weight: ctx.prior_weight,
            volume: range.at_reps(next_reps).to_string(),
            intensity: ctx.prior_intensity.to_owned(),
        }
    }

    /// Pick a same-movement-pattern alternate and reset it to entry volume
    fn substitute(
        &self,
        ctx: &FeedbackContext<'_>,
        catalog: &[ExerciseCatalogEntry],
    ) -> ProgressionRecommendation {
        let pattern = catalog
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(ctx.exercise))
            .and_then(ExerciseCatalogEntry::movement_pattern);

        let alternate = pattern.and_then(|pattern| {
            catalog.iter().find(|entry| {
                !entry.name.eq_ignore_ascii_case(ctx.exercise)
                    && entry.movement_pattern() == Some(pattern)
            })
        });

        match alternate {
            Some(entry) => {
                let volume = entry
                    .entry_volume()
                    .unwrap_or_else(|| ctx.tier.default_entry_volume());
                ProgressionRecommendation {
                    original: ctx.exercise.to_owned(),
                    suggested: entry.name.clone(),
                    weight: ctx.prior_weight,
                    volume: volume.to_string(),
                    intensity: ENTRY_INTENSITY.to_owned(),
                }
            }
            None => {
                // No same-pattern alternate authored: keep the exercise but
                // drop it back to its entry range
                warn!(
                    exercise = %ctx.exercise,
                    "no substitution candidate in catalog, resetting to entry volume"
                );
                let volume = Self::entry_volume_for(ctx.exercise, ctx.tier, catalog);
                ProgressionRecommendation {
                    original: ctx.exercise.to_owned(),
                    suggested: ctx.exercise.to_owned(),
                    weight: ctx.prior_weight,
                    volume: volume.to_string(),
                    intensity: ENTRY_INTENSITY.to_owned(),
                }
            }
        }
    }

    /// Entry-level range for an exercise: catalog attribute first, tier
    /// default otherwise
    fn entry_volume_for(
        exercise: &str,
        tier: ExperienceTier,
        catalog: &[ExerciseCatalogEntry],
    ) -> Volume {
        catalog
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(exercise))
            .and_then(ExerciseCatalogEntry::entry_volume)
            .unwrap_or_else(|| tier.default_entry_volume())
    }

    /// Consult the model for a recommendation, then clamp it to the policy.
    ///
    /// Follows the same invoke/recover discipline as program generation but
    /// with no fallback: model, recovery, and reference-data failures all
    /// surface to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ReferenceDataUnavailable` when either provider has no data,
    /// and any model or recovery failure unchanged.
    pub async fn recommend_with_model(
        &self,
        ctx: &FeedbackContext<'_>,
        provider: &dyn LlmProvider,
        reference_provider: &dyn ProgressionReferenceProvider,
        catalog_provider: &dyn ExerciseCatalogProvider,
    ) -> Result<ProgressionRecommendation, AppError> {
        let reference = reference_provider
            .fetch_all()
            .await
            .map_err(|e| AppError::reference_data_unavailable("progression reference data").with_source(e))?;
        let catalog = catalog_provider
            .fetch_by_difficulty(ctx.tier)
            .await
            .map_err(|e| AppError::reference_data_unavailable("exercise catalog").with_source(e))?;

        // The policy result doubles as validator for the model output
        let policy = self.recommend(ctx, &reference, &catalog)?;

        let prompt = prompts::feedback_prompt(
            ctx.exercise,
            ctx.prior_volume,
            ctx.prior_intensity,
            ctx.prior_weight,
            &ctx.signal,
            ctx.tier,
            &reference,
            &catalog,
        );
        let chat = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_model_override(self.config.model.as_deref())
            .with_temperature(0.2);

        let response = invoke_with_timeout(provider, &chat, self.config.request_timeout).await?;
        let document = recovery::recover(&response.content, ExpectedSchema::Recommendation)?;
        let envelope: RecommendationEnvelope = serde_json::from_str(&document).map_err(|e| {
            AppError::recovery_failed(format!("recovered recommendation does not decode: {e}"))
        })?;

        Ok(Self::clamp_to_policy(envelope.recommendation, policy, ctx))
    }

    /// Enforce the deterministic policy's invariants on a model-produced
    /// recommendation
    fn clamp_to_policy(
        mut model: ProgressionRecommendation,
        policy: ProgressionRecommendation,
        ctx: &FeedbackContext<'_>,
    ) -> ProgressionRecommendation {
        model.original = ctx.exercise.to_owned();

        let policy_substituted = policy.suggested != policy.original;
        let model_substituted = !model.suggested.eq_ignore_ascii_case(ctx.exercise);

        if policy_substituted != model_substituted {
            info!(
                exercise = %ctx.exercise,
                model_suggestion = %model.suggested,
                "model recommendation disagrees with policy on substitution, using policy"
            );
            return policy;
        }

        // Load may only move where the policy sanctioned it
        if model.weight > ctx.prior_weight && policy.weight <= ctx.prior_weight {
            info!(
                exercise = %ctx.exercise,
                model_weight = model.weight,
                "reverting unsanctioned load increase"
            );
            model.weight = policy.weight;
        }

        // The volume contract is set×rep notation, never a bare number
        if Volume::parse(&model.volume).is_none() {
            model.volume = policy.volume.clone();
        }

        if model.intensity.trim().is_empty() {
            model.intensity = policy.intensity;
        }

        model
    }
}

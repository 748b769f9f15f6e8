// ABOUTME: Environment-only engine configuration with validated defaults
// ABOUTME: Covers model selection, call timeout, and progression tuning constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Engine Configuration
//!
//! Environment-only configuration. Every knob has a production default so a
//! bare environment works; the progression tuning constants are exposed
//! because the underlying training methodology treats them as policy, not
//! physics.

use std::env;
use std::time::Duration;

use crate::errors::{AppError, AppResult};

/// Environment variable for overriding the generation model
pub const MODEL_ENV: &str = "GYMMATE_LLM_MODEL";

/// Environment variable for the model call timeout in seconds
pub const TIMEOUT_ENV: &str = "GYMMATE_LLM_TIMEOUT_SECS";

/// Environment variable for the load progression increment
pub const WEIGHT_INCREMENT_ENV: &str = "GYMMATE_WEIGHT_INCREMENT";

/// Environment variable for the joint-pain substitution threshold
pub const PAIN_THRESHOLD_ENV: &str = "GYMMATE_PAIN_THRESHOLD";

/// Default model call timeout
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tuning constants for the progression decision policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressionTuning {
    /// Fixed load increment applied when a rep range tops out (kg)
    pub weight_increment: f64,
    /// Joint pain rating at or above which the engine substitutes the exercise
    pub pain_substitution_threshold: u8,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            weight_increment: 2.5,
            pain_substitution_threshold: 4,
        }
    }
}

/// Engine-wide configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model override passed to the provider; `None` uses the provider default
    pub model: Option<String>,
    /// Timeout applied around every model invocation
    pub request_timeout: Duration,
    /// Progression decision policy constants
    pub tuning: ProgressionTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tuning: ProgressionTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a set variable cannot be parsed; unset
    /// variables fall back to defaults.
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let model = env::var(MODEL_ENV).ok().filter(|m| !m.trim().is_empty());

        let request_timeout = match env::var(TIMEOUT_ENV) {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::config(format!("{TIMEOUT_ENV} must be an integer, got '{raw}'"))
                })?;
                if secs == 0 {
                    return Err(AppError::config(format!("{TIMEOUT_ENV} must be positive")));
                }
                Duration::from_secs(secs)
            }
            Err(_) => defaults.request_timeout,
        };

        let weight_increment = match env::var(WEIGHT_INCREMENT_ENV) {
            Ok(raw) => {
                let increment: f64 = raw.parse().map_err(|_| {
                    AppError::config(format!(
                        "{WEIGHT_INCREMENT_ENV} must be a number, got '{raw}'"
                    ))
                })?;
                if increment <= 0.0 {
                    return Err(AppError::config(format!(
                        "{WEIGHT_INCREMENT_ENV} must be positive"
                    )));
                }
                increment
            }
            Err(_) => defaults.tuning.weight_increment,
        };

        let pain_substitution_threshold = match env::var(PAIN_THRESHOLD_ENV) {
            Ok(raw) => {
                let threshold: u8 = raw.parse().map_err(|_| {
                    AppError::config(format!("{PAIN_THRESHOLD_ENV} must be 0-5, got '{raw}'"))
                })?;
                if threshold > 5 {
                    return Err(AppError::config(format!("{PAIN_THRESHOLD_ENV} must be 0-5")));
                }
                threshold
            }
            Err(_) => defaults.tuning.pain_substitution_threshold,
        };

        Ok(Self {
            model,
            request_timeout,
            tuning: ProgressionTuning {
                weight_increment,
                pain_substitution_threshold,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!((config.tuning.weight_increment - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.tuning.pain_substitution_threshold, 4);
        assert!(config.model.is_none());
    }
}

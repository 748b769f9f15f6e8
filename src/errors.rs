// ABOUTME: Unified error handling with standard error codes for the coaching engine
// ABOUTME: Maps every failure kind to a code the external transport layer can render
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Unified Error Handling System
//!
//! Central error types for the GymMate engine. The engine itself recovers
//! from most generation failures by falling back to the static program
//! catalog; the codes here exist so the failures that *do* surface carry a
//! stable, serializable identity for whatever transport sits in front of
//! the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Model invocation (1000-1999)
    #[serde(rename = "MODEL_UNAVAILABLE")]
    ModelUnavailable = 1000,
    #[serde(rename = "MODEL_TIMEOUT")]
    ModelTimeout = 1001,
    #[serde(rename = "MODEL_RATE_LIMITED")]
    ModelRateLimited = 1002,

    // Response recovery and structural contracts (2000-2999)
    #[serde(rename = "RECOVERY_FAILED")]
    RecoveryFailed = 2000,
    #[serde(rename = "DAY_COUNT_MISMATCH")]
    DayCountMismatch = 2001,
    #[serde(rename = "FALLBACK_SHORTFALL")]
    FallbackShortfall = 2002,

    // Reference data (3000-3999)
    #[serde(rename = "REFERENCE_DATA_UNAVAILABLE")]
    ReferenceDataUnavailable = 3000,

    // Validation (4000-4999)
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 4000,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::DayCountMismatch => 400,

            // The model is an external collaborator
            Self::ModelUnavailable | Self::RecoveryFailed => 502,
            Self::ModelTimeout => 504,
            Self::ModelRateLimited => 429,

            Self::ReferenceDataUnavailable | Self::FallbackShortfall => 503,

            Self::ConfigError | Self::InternalError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ModelUnavailable => "The generative model could not be reached",
            Self::ModelTimeout => "The generative model did not respond in time",
            Self::ModelRateLimited => "The generative model rate limit was exceeded",
            Self::RecoveryFailed => {
                "The model response could not be recovered into a valid document"
            }
            Self::DayCountMismatch => {
                "The generated program does not match the requested day count"
            }
            Self::FallbackShortfall => {
                "The fallback catalog has fewer authored days than requested"
            }
            Self::ReferenceDataUnavailable => {
                "Progression reference data or exercise catalog is unavailable"
            }
            Self::InvalidInput => "The provided input is invalid",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal engine error occurred",
        }
    }
}

/// Unified error type for the engine
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience functions for creating common errors
impl AppError {
    /// The model endpoint could not be reached or returned a hard failure
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ModelUnavailable, message)
    }

    /// The model call exceeded the configured timeout
    pub fn model_timeout(timeout_secs: u64) -> Self {
        Self::new(
            ErrorCode::ModelTimeout,
            format!("model call exceeded {timeout_secs}s timeout"),
        )
    }

    /// Response recovery exhausted all stages
    pub fn recovery_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RecoveryFailed, message)
    }

    /// The recovered program has the wrong number of days
    pub fn day_count_mismatch(expected: usize, actual: usize) -> Self {
        Self::new(
            ErrorCode::DayCountMismatch,
            format!("expected {expected} training days, model produced {actual}"),
        )
    }

    /// The fallback catalog cannot cover the requested day count
    pub fn fallback_shortfall(requested: usize, available: usize) -> Self {
        Self::new(
            ErrorCode::FallbackShortfall,
            format!("requested {requested} days but the fallback catalog authors only {available}"),
        )
    }

    /// Progression reference data or catalog is missing
    pub fn reference_data_unavailable(what: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ReferenceDataUnavailable,
            format!("{} is unavailable", what.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal engine error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

/// HTTP error response format for the external transport layer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorResponseDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
            },
        }
    }
}

/// Conversion from `anyhow::Error` for callers composing the engine
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ErrorCode::InternalError, error.to_string())
    }
}

// ABOUTME: Multi-stage recovery of structured documents from raw model output
// ABOUTME: Strip-then-extract with schema required-field checks, sentinel failures only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Response Recovery
//!
//! Generative models reliably wrap JSON in markdown fences or prepend
//! apology text to otherwise valid payloads. Recovery runs in order,
//! stopping at the first success:
//!
//! 1. Strip a leading/trailing fenced-code marker and attempt a direct
//!    parse.
//! 2. On parse failure, scan the raw text for the first balanced
//!    brace-delimited substring (string- and escape-aware) and parse that
//!    substring alone.
//! 3. Validate the required top-level fields for the expected schema. A
//!    syntactically valid document missing its required field is a recovery
//!    failure, not a success.
//!
//! Failures are sentinel values, never panics, so the orchestrator always
//! controls the fallback decision. This is the engine's single local
//! recovery attempt; there is no second network call.

use serde_json::Value;
use std::fmt;

use crate::errors::AppError;

/// Why recovery failed, reported as a sentinel to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryFailure {
    /// The raw text contains no brace-delimited candidate at all
    NoJsonFound,
    /// A candidate was found but is not valid JSON
    ParseError,
    /// The document parsed but lacks the schema's required field(s)
    MissingField,
}

impl RecoveryFailure {
    /// Stable string representation for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoJsonFound => "no_json_found",
            Self::ParseError => "parse_error",
            Self::MissingField => "missing_field",
        }
    }
}

impl fmt::Display for RecoveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RecoveryFailure> for AppError {
    fn from(failure: RecoveryFailure) -> Self {
        Self::recovery_failed(format!("model response recovery failed: {failure}"))
    }
}

/// Which document shape the caller expects back from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedSchema {
    /// `{"program": {<day>: [...]}}` for program generation
    Program,
    /// `{"recommendation": {...}}` for feedback adjustment
    Recommendation,
    /// `{"action", "workoutDays", "goal"}` for an embedded chat directive
    ChatDirective,
}

/// Strip a surrounding markdown code fence, language tag included
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence's language tag ("json", "JSON", ...) if present
    let body = body.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let body = body.trim_start();
    let body = body.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}

/// Byte range of the first balanced brace-delimited substring, respecting
/// JSON string literals and escapes. Used here for extraction and by the
/// chat layer to excise directive blocks from conversational text.
pub(crate) fn braced_span(raw: &str) -> Option<std::ops::Range<usize>> {
    let start = raw.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in raw.as_bytes().iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start..offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find the first balanced brace-delimited substring
fn extract_braced(raw: &str) -> Option<&str> {
    braced_span(raw).map(|range| &raw[range])
}

/// Check the required top-level field(s) for a schema
fn validate_required(value: &Value, schema: ExpectedSchema) -> Result<(), RecoveryFailure> {
    let present = match schema {
        ExpectedSchema::Program => value.get("program").is_some_and(|program| match program {
            Value::Object(map) => !map.is_empty(),
            Value::Array(entries) => !entries.is_empty(),
            _ => false,
        }),
        ExpectedSchema::Recommendation => value
            .get("recommendation")
            .and_then(Value::as_object)
            .is_some_and(|map| {
                map.contains_key("suggested")
                    || map.contains_key("Suggested")
                    || map.contains_key("suggestedExercise")
            }),
        ExpectedSchema::ChatDirective => value.as_object().is_some_and(|map| {
            map.contains_key("action")
                && (map.contains_key("workoutDays") || map.contains_key("workout_days"))
                && map.contains_key("goal")
        }),
    };

    if present {
        Ok(())
    } else {
        Err(RecoveryFailure::MissingField)
    }
}

/// Recover a structured document from raw model output.
///
/// Returns the validated JSON document text rather than a parsed tree so
/// callers can decode it with order-preserving typed deserialization;
/// day order in a program document is meaningful.
///
/// # Errors
///
/// Returns the typed `RecoveryFailure` sentinel; this function never
/// panics and performs no I/O.
pub fn recover(raw: &str, schema: ExpectedSchema) -> Result<String, RecoveryFailure> {
    let stripped = strip_code_fence(raw);

    let (candidate, value) = match serde_json::from_str::<Value>(stripped) {
        Ok(value) => (stripped, value),
        Err(_) => {
            let Some(candidate) = extract_braced(raw) else {
                return Err(if raw.contains('{') {
                    RecoveryFailure::ParseError
                } else {
                    RecoveryFailure::NoJsonFound
                });
            };
            let value =
                serde_json::from_str(candidate).map_err(|_| RecoveryFailure::ParseError)?;
            (candidate, value)
        }
    };

    validate_required(&value, schema)?;
    Ok(candidate.to_owned())
}

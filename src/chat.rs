// ABOUTME: Chat intent detection for program-creation directives embedded in free text
// ABOUTME: Absence of a directive is indistinguishable from the model not intending one
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Chat Intent Detection
//!
//! The conversational prompt instructs the model to embed a structured
//! `create_program` directive block when, and only when, the user clearly
//! asked for a new program. This module scans model output for that block
//! using the same two-tier recovery as program generation.
//!
//! Detection never raises. A malformed block, a block with missing fields,
//! or a block with out-of-range values is treated as absent and the text
//! passes through as ordinary conversational output; the end user never
//! sees a directive error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::llm::{invoke_with_timeout, prompts, ChatMessage, ChatRequest, LlmProvider};
use crate::models::{ChatDirective, CREATE_PROGRAM_ACTION};
use crate::recovery::{self, ExpectedSchema};

/// A conversational reply with any embedded directive separated out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Conversational text with the directive block excised
    pub text: String,
    /// The detected directive, if the model embedded one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<ChatDirective>,
}

/// Scan model output for an embedded `create_program` directive.
///
/// Returns `None` for anything that is not a complete, in-range directive:
/// the conversational text is then passed through unchanged.
#[must_use]
pub fn detect(raw: &str) -> Option<ChatDirective> {
    let document = recovery::recover(raw, ExpectedSchema::ChatDirective).ok()?;
    let directive: ChatDirective = serde_json::from_str(&document).ok()?;

    if directive.action != CREATE_PROGRAM_ACTION {
        debug!(action = %directive.action, "ignoring directive with unknown action");
        return None;
    }
    if !(1..=7).contains(&directive.workout_days) {
        debug!(
            workout_days = directive.workout_days,
            "ignoring directive with out-of-range day count"
        );
        return None;
    }

    Some(directive)
}

/// Split model output into conversational text and an optional directive.
///
/// When a directive is found, its JSON block (and any leftover fence
/// markers) are removed from the visible text.
#[must_use]
pub fn split_directive(raw: &str) -> (String, Option<ChatDirective>) {
    let Some(directive) = detect(raw) else {
        return (raw.trim().to_owned(), None);
    };

    let mut text = match recovery::braced_span(raw) {
        Some(range) => {
            let mut remaining = String::with_capacity(raw.len() - range.len());
            remaining.push_str(&raw[..range.start]);
            remaining.push_str(&raw[range.end..]);
            remaining
        }
        None => raw.to_owned(),
    };

    // The block is usually fenced; drop the markers it leaves behind
    text = text.replace("```json", "").replace("```", "");

    (text.trim().to_owned(), Some(directive))
}

/// Conversational coach entry point
#[derive(Debug, Clone, Default)]
pub struct ChatCoach {
    config: EngineConfig,
}

impl ChatCoach {
    /// Create a coach with the given configuration
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Send one user message through the coach persona and detect any
    /// embedded directive in the reply.
    ///
    /// # Errors
    ///
    /// Returns model invocation failures (`ModelUnavailable`,
    /// `ModelTimeout`). Directive detection itself never fails.
    pub async fn converse(
        &self,
        provider: &dyn LlmProvider,
        user_message: &str,
    ) -> Result<ChatReply, AppError> {
        let chat = ChatRequest::new(vec![
            ChatMessage::system(prompts::get_coach_system_prompt()),
            ChatMessage::user(user_message),
        ])
        .with_model_override(self.config.model.as_deref())
        .with_temperature(0.8);

        let response = invoke_with_timeout(provider, &chat, self.config.request_timeout).await?;
        let (text, directive) = split_directive(&response.content);

        Ok(ChatReply { text, directive })
    }
}

// ABOUTME: Main library entry point for the GymMate AI coaching engine
// ABOUTME: Program generation and adaptive progression around an untrusted generative model
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

#![deny(unsafe_code)]

//! # GymMate Engine
//!
//! The program generation and adaptive progression core behind the GymMate
//! coaching product. The engine delegates content generation to an external
//! generative language model while guaranteeing a structurally valid,
//! day-count-exact result even when the model misbehaves.
//!
//! ## Architecture
//!
//! - **Prompt builders** encode hard structural constraints redundantly
//!   because the model ignores single-statement instructions
//! - **Response recovery** repairs fenced or prose-wrapped JSON in one
//!   local pass, with typed sentinel failures
//! - **The program assembler** validates the day-count contract post hoc
//!   and falls back to the static per-tier catalog on any failure
//! - **The progression engine** applies deterministic decision rules to
//!   post-workout feedback; there is no fallback for recommendations
//! - **Chat intent detection** lifts `create_program` directives out of
//!   otherwise free-text replies, never surfacing errors to the user
//!
//! The HTTP transport, user-profile storage, and the exercise/progression
//! reference store are external collaborators, integrated through the
//! traits in [`llm`] and [`catalog`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use gymmate_engine::catalog::StaticExerciseCatalog;
//! use gymmate_engine::config::EngineConfig;
//! use gymmate_engine::llm::GeminiProvider;
//! use gymmate_engine::models::{ExperienceTier, Gender, Goal, ProgramRequest};
//! use gymmate_engine::program::ProgramAssembler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = GeminiProvider::from_env()?;
//!     let catalog = StaticExerciseCatalog::default();
//!     let assembler = ProgramAssembler::new(EngineConfig::from_env()?);
//!
//!     let request = ProgramRequest::new(
//!         Gender::Female,
//!         ExperienceTier::Beginner,
//!         Goal::FatLoss,
//!         4,
//!         None,
//!     )?;
//!
//!     let result = assembler.generate(&request, &provider, &catalog).await;
//!     println!("{} days from {:?}", result.program.day_count(), result.source);
//!     Ok(())
//! }
//! ```

/// Reference data provider interfaces and in-memory implementations
pub mod catalog;

/// Chat intent detection for embedded program-creation directives
pub mod chat;

/// Environment-only engine configuration
pub mod config;

/// Unified error handling system with standard error codes
pub mod errors;

/// Static per-tier fallback program catalog
pub mod fallback;

/// LLM provider abstraction for generative model integration
pub mod llm;

/// Production logging and structured output
pub mod logging;

/// Common data models for requests, prescriptions, and feedback
pub mod models;

/// Program assembler orchestrating generation with fallback guarantees
pub mod program;

/// Feedback-to-recommendation progression engine
pub mod progression;

/// Multi-stage recovery of structured documents from raw model output
pub mod recovery;

// ABOUTME: Service provider interfaces for exercise catalog and progression reference data
// ABOUTME: Includes in-memory implementations for tests and single-process deployments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Reference Data Providers
//!
//! The exercise catalog and the progression reference document live in an
//! external store; the engine only depends on these two narrow interfaces.
//! An empty catalog response is valid data ("no exercises authored for this
//! tier"), not an error: the program assembler treats it as a forced
//! fallback, while the progression engine treats it as
//! `ReferenceDataUnavailable` because it cannot substitute exercises
//! without one.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{ExerciseCatalogEntry, ExperienceTier};

/// Supplies exercise records filtered by difficulty tier
#[async_trait]
pub trait ExerciseCatalogProvider: Send + Sync {
    /// Fetch the catalog subset for one experience tier.
    ///
    /// An empty list is a valid response and must be handled as "no data".
    ///
    /// # Errors
    ///
    /// Returns an error only for store-level failures; absence of data is
    /// not an error.
    async fn fetch_by_difficulty(
        &self,
        tier: ExperienceTier,
    ) -> Result<Vec<ExerciseCatalogEntry>, AppError>;
}

/// Supplies the progression reference records, passed to prompts verbatim
#[async_trait]
pub trait ProgressionReferenceProvider: Send + Sync {
    /// Fetch all progression reference records.
    ///
    /// # Errors
    ///
    /// Returns an error only for store-level failures.
    async fn fetch_all(&self) -> Result<Vec<serde_json::Value>, AppError>;
}

// ============================================================================
// In-Memory Implementations
// ============================================================================

/// In-memory exercise catalog
#[derive(Debug, Clone, Default)]
pub struct StaticExerciseCatalog {
    entries: Vec<ExerciseCatalogEntry>,
}

impl StaticExerciseCatalog {
    /// Create a catalog from a fixed entry list
    #[must_use]
    pub fn new(entries: Vec<ExerciseCatalogEntry>) -> Self {
        Self { entries }
    }

    /// All entries regardless of tier
    #[must_use]
    pub fn entries(&self) -> &[ExerciseCatalogEntry] {
        &self.entries
    }
}

#[async_trait]
impl ExerciseCatalogProvider for StaticExerciseCatalog {
    async fn fetch_by_difficulty(
        &self,
        tier: ExperienceTier,
    ) -> Result<Vec<ExerciseCatalogEntry>, AppError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.difficulty == tier)
            .cloned()
            .collect())
    }
}

/// In-memory progression reference store
#[derive(Debug, Clone, Default)]
pub struct StaticProgressionReference {
    records: Vec<serde_json::Value>,
}

impl StaticProgressionReference {
    /// Create a store from fixed records
    #[must_use]
    pub fn new(records: Vec<serde_json::Value>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ProgressionReferenceProvider for StaticProgressionReference {
    async fn fetch_all(&self) -> Result<Vec<serde_json::Value>, AppError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_catalog_filters_by_tier() {
        let catalog = StaticExerciseCatalog::new(vec![
            ExerciseCatalogEntry::new("Squat", ExperienceTier::Beginner),
            ExerciseCatalogEntry::new("Front Squat", ExperienceTier::Advanced),
        ]);

        let beginner = catalog
            .fetch_by_difficulty(ExperienceTier::Beginner)
            .await
            .unwrap();
        assert_eq!(beginner.len(), 1);
        assert_eq!(beginner[0].name, "Squat");

        let intermediate = catalog
            .fetch_by_difficulty(ExperienceTier::Intermediate)
            .await
            .unwrap();
        assert!(intermediate.is_empty());
    }
}

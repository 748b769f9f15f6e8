// ABOUTME: Common data models for program requests, prescriptions, and feedback
// ABOUTME: Absorbs model-output field variance through serde aliases and untagged types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Engine Data Model
//!
//! Value types shared by the prompt builders, the response recovery layer,
//! and the progression engine. The generative model is an unreliable
//! producer, so the deserializable types here accept every field spelling
//! the model has been observed to emit (`exercise`/`name`, `rir`/`rpe`,
//! numeric or textual set counts) and normalize on serialization.

use regex::Regex;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

use crate::errors::{AppError, AppResult};

// ============================================================================
// User Vocabulary
// ============================================================================
//
// The mobile client historically sent Turkish vocabulary while the engine
// reasons in English. Each enum is the single bidirectional mapping for its
// concept: `parse` accepts both languages, `from_input` adds the
// deterministic default branch for unrecognized input.

/// User gender, used for program structure emphasis in the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Canonical string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse from English or Turkish user vocabulary
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "man" | "m" | "erkek" => Some(Self::Male),
            "female" | "woman" | "f" | "kadın" | "kadin" => Some(Self::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experience classification gating exercise selection and fallback programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceTier {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceTier {
    /// Canonical string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Parse from English or Turkish user vocabulary
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "başlangıç" | "baslangic" => Some(Self::Beginner),
            "intermediate" | "orta seviye" | "orta" => Some(Self::Intermediate),
            "advanced" | "ileri seviye" | "ileri" => Some(Self::Advanced),
            _ => None,
        }
    }

    /// Parse with the deterministic default branch for unrecognized input
    #[must_use]
    pub fn from_input(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Beginner)
    }

    /// Entry-level set×rep range a fresh prescription starts at for this tier
    #[must_use]
    pub const fn default_entry_volume(&self) -> Volume {
        match self {
            Self::Beginner | Self::Intermediate => Volume {
                sets: 3,
                rep_low: 8,
                rep_high: Some(12),
            },
            Self::Advanced => Volume {
                sets: 4,
                rep_low: 6,
                rep_high: Some(10),
            },
        }
    }
}

impl fmt::Display for ExperienceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training goal driving exercise selection and loading scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    MuscleGain,
    FatLoss,
}

impl Goal {
    /// Canonical string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MuscleGain => "muscle_gain",
            Self::FatLoss => "fat_loss",
        }
    }

    /// Parse from English or Turkish user vocabulary
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "muscle_gain" | "muscle gain" | "bulk" | "kas kazanımı" | "kas kazanimi" => {
                Some(Self::MuscleGain)
            }
            "fat_loss" | "fat loss" | "cut" | "yağ yakımı" | "yag yakimi" | "kilo verme" => {
                Some(Self::FatLoss)
            }
            _ => None,
        }
    }

    /// Parse with the deterministic default branch for unrecognized input
    #[must_use]
    pub fn from_input(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::MuscleGain)
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Program Request
// ============================================================================

/// A single program generation request, constructed once per inbound call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramRequest {
    pub gender: Gender,
    pub experience: ExperienceTier,
    pub goal: Goal,
    pub workout_days: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_area: Option<String>,
}

impl ProgramRequest {
    /// Create a validated request
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `workout_days` is outside `[1, 7]`.
    pub fn new(
        gender: Gender,
        experience: ExperienceTier,
        goal: Goal,
        workout_days: u8,
        focus_area: Option<String>,
    ) -> AppResult<Self> {
        if !(1..=7).contains(&workout_days) {
            return Err(AppError::invalid_input(format!(
                "workout_days must be between 1 and 7, got {workout_days}"
            )));
        }
        Ok(Self {
            gender,
            experience,
            goal,
            workout_days,
            focus_area,
        })
    }
}

// ============================================================================
// Exercise Catalog
// ============================================================================

/// Well-known attribute key: movement pattern used for substitution matching
pub const ATTR_MOVEMENT_PATTERN: &str = "movement_pattern";

/// Well-known attribute key: entry-level set×rep range for the exercise
pub const ATTR_ENTRY_VOLUME: &str = "entry_volume";

/// An exercise record owned by the external catalog provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCatalogEntry {
    pub name: String,
    pub difficulty: ExperienceTier,
    /// Opaque provider attributes; the engine reads only the well-known keys
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ExerciseCatalogEntry {
    /// Create an entry with no attributes
    #[must_use]
    pub fn new(name: impl Into<String>, difficulty: ExperienceTier) -> Self {
        Self {
            name: name.into(),
            difficulty,
            attributes: serde_json::Map::new(),
        }
    }

    /// Attach an attribute, builder style
    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: serde_json::Value) -> Self {
        self.attributes.insert(key.to_owned(), value);
        self
    }

    /// Movement pattern this exercise trains, if the provider supplies one
    #[must_use]
    pub fn movement_pattern(&self) -> Option<&str> {
        self.attributes
            .get(ATTR_MOVEMENT_PATTERN)
            .and_then(serde_json::Value::as_str)
    }

    /// Entry-level set×rep range for this exercise, if the provider supplies one
    #[must_use]
    pub fn entry_volume(&self) -> Option<Volume> {
        self.attributes
            .get(ATTR_ENTRY_VOLUME)
            .and_then(serde_json::Value::as_str)
            .and_then(Volume::parse)
    }
}

// ============================================================================
// Set×Rep Notation
// ============================================================================

static VOLUME_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    // Matches: 3x12, 3 x 12, 4X6-10, 3×10-15
    Regex::new(r"^\s*(\d+)\s*[xX×]\s*(\d+)(?:\s*-\s*(\d+))?\s*$").ok()
});

/// Parsed set×rep notation (`3x12` or `3x10-15`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    pub sets: u32,
    pub rep_low: u32,
    pub rep_high: Option<u32>,
}

impl Volume {
    /// Parse `SxR` / `SxL-H` notation. Returns `None` for anything else
    /// (timed holds like `"20 min"` are valid prescriptions but not volumes).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let caps = VOLUME_PATTERN.as_ref()?.captures(s)?;
        let sets: u32 = caps.get(1)?.as_str().parse().ok()?;
        let rep_low: u32 = caps.get(2)?.as_str().parse().ok()?;
        let rep_high = match caps.get(3) {
            Some(m) => {
                let high: u32 = m.as_str().parse().ok()?;
                if high <= rep_low {
                    return None;
                }
                Some(high)
            }
            None => None,
        };
        if sets == 0 || rep_low == 0 {
            return None;
        }
        Some(Self {
            sets,
            rep_low,
            rep_high,
        })
    }

    /// Whether this volume prescribes a rep range rather than a fixed count
    #[must_use]
    pub const fn is_range(&self) -> bool {
        self.rep_high.is_some()
    }

    /// Integer midpoint of the rep range (the floor of `(low + high) / 2`);
    /// for a fixed count, the count itself
    #[must_use]
    pub fn midpoint(&self) -> u32 {
        self.rep_high
            .map_or(self.rep_low, |high| (self.rep_low + high) / 2)
    }

    /// Top of the rep range; for a fixed count, the count itself
    #[must_use]
    pub fn top(&self) -> u32 {
        self.rep_high.unwrap_or(self.rep_low)
    }

    /// Same set count with a fixed rep target
    #[must_use]
    pub const fn at_reps(&self, reps: u32) -> Self {
        Self {
            sets: self.sets,
            rep_low: reps,
            rep_high: None,
        }
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rep_high {
            Some(high) => write!(f, "{}x{}-{}", self.sets, self.rep_low, high),
            None => write!(f, "{}x{}", self.sets, self.rep_low),
        }
    }
}

// ============================================================================
// Prescriptions and Programs
// ============================================================================

/// Set prescription: the model emits either a bare count or notation text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetScheme {
    Count(u32),
    Text(String),
}

impl fmt::Display for SetScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn default_set_scheme() -> SetScheme {
    SetScheme::Count(3)
}

fn default_reps() -> String {
    "8-12".to_owned()
}

fn default_intensity() -> String {
    "2-3".to_owned()
}

/// One exercise line within a training day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePrescription {
    #[serde(alias = "exercise")]
    pub name: String,
    #[serde(default = "default_set_scheme")]
    pub sets: SetScheme,
    #[serde(default = "default_reps")]
    pub reps: String,
    #[serde(
        rename = "intensityMarker",
        alias = "rir",
        alias = "rpe",
        alias = "RIR",
        alias = "RPE",
        alias = "intensity",
        default = "default_intensity"
    )]
    pub intensity: String,
}

impl ExercisePrescription {
    /// Construct a prescription with canonical fields
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        sets: u32,
        reps: impl Into<String>,
        intensity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sets: SetScheme::Count(sets),
            reps: reps.into(),
            intensity: intensity.into(),
        }
    }
}

/// A day entry in the array form some model responses use
#[derive(Debug, Deserialize)]
struct DayEntry {
    #[serde(alias = "label")]
    day: String,
    #[serde(default)]
    exercises: Vec<ExercisePrescription>,
}

/// Ordered mapping from day label to exercise prescriptions.
///
/// The single most important structural invariant in the engine is that
/// `day_count()` equals the requested `workout_days`; the assembler enforces
/// it after recovery. The map serializes in day order and deserializes from
/// either the canonical label map or the array-of-day-objects form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedProgram {
    days: Vec<(String, Vec<ExercisePrescription>)>,
}

impl GeneratedProgram {
    /// An empty program
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a training day, preserving order
    pub fn push_day(&mut self, label: impl Into<String>, exercises: Vec<ExercisePrescription>) {
        self.days.push((label.into(), exercises));
    }

    /// Number of day entries
    #[must_use]
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Whether the program has no days at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterate days in order
    pub fn days(&self) -> impl Iterator<Item = (&str, &[ExercisePrescription])> {
        self.days
            .iter()
            .map(|(label, exercises)| (label.as_str(), exercises.as_slice()))
    }

    /// Total prescriptions across all days
    #[must_use]
    pub fn exercise_count(&self) -> usize {
        self.days.iter().map(|(_, exercises)| exercises.len()).sum()
    }

    /// First `max_days` days of the program, in order. Never pads.
    #[must_use]
    pub fn truncated(&self, max_days: usize) -> Self {
        Self {
            days: self.days.iter().take(max_days).cloned().collect(),
        }
    }

    /// Apply a sanitation pass to each day's prescriptions, then drop days
    /// left without any exercises
    pub fn sanitize_exercises<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ExercisePrescription) -> bool,
    {
        for (_, exercises) in &mut self.days {
            exercises.retain(|prescription| {
                !prescription.name.trim().is_empty() && keep(prescription)
            });
        }
        self.days.retain(|(_, exercises)| !exercises.is_empty());
    }
}

impl Serialize for GeneratedProgram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.days.len()))?;
        for (label, exercises) in &self.days {
            map.serialize_entry(label, exercises)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GeneratedProgram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProgramVisitor;

        impl<'de> Visitor<'de> for ProgramVisitor {
            type Value = GeneratedProgram;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a day-label map or a sequence of day objects")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut days = Vec::new();
                while let Some((label, exercises)) =
                    access.next_entry::<String, Vec<ExercisePrescription>>()?
                {
                    days.push((label, exercises));
                }
                Ok(GeneratedProgram { days })
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut days = Vec::new();
                while let Some(entry) = access.next_element::<DayEntry>()? {
                    days.push((entry.day, entry.exercises));
                }
                Ok(GeneratedProgram { days })
            }
        }

        deserializer.deserialize_any(ProgramVisitor)
    }
}

// ============================================================================
// Program Result
// ============================================================================

/// Where the returned program came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramSource {
    Model,
    Fallback,
}

impl ProgramSource {
    /// API string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

/// Final validated output of program generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramResult {
    pub program: GeneratedProgram,
    pub source: ProgramSource,
    /// Set only when neither generation nor fallback could produce a
    /// day-count-correct program (shortfall or total failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the engine produced this result
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// Feedback and Recommendations
// ============================================================================

/// Post-workout feedback for a single exercise
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeedbackSignal {
    /// Whether the prescribed sets/reps were completed
    #[serde(alias = "achived")]
    pub achieved: bool,
    /// Joint pain during the exercise, 0-5
    pub joint_pain: u8,
    /// Perceived muscle pump, 0-5
    #[serde(alias = "pump")]
    pub pump_rating: u8,
}

impl FeedbackSignal {
    /// Create a validated signal
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if either rating exceeds 5.
    pub fn new(achieved: bool, joint_pain: u8, pump_rating: u8) -> AppResult<Self> {
        if joint_pain > 5 || pump_rating > 5 {
            return Err(AppError::invalid_input(format!(
                "joint_pain and pump_rating must be 0-5, got {joint_pain}/{pump_rating}"
            )));
        }
        Ok(Self {
            achieved,
            joint_pain,
            pump_rating,
        })
    }
}

fn deserialize_weight<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WeightField {
        Number(f64),
        Text(String),
    }

    match WeightField::deserialize(deserializer)? {
        WeightField::Number(n) => Ok(n),
        WeightField::Text(s) => s
            .trim()
            .trim_end_matches("kg")
            .trim()
            .parse::<f64>()
            .map_err(serde::de::Error::custom),
    }
}

/// One adjustment recommendation for a single exercise.
///
/// `suggested == original` means "keep the exercise"; a different name
/// signals a substitution with a fresh entry-level range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecommendation {
    #[serde(alias = "originalExercise")]
    pub original: String,
    #[serde(alias = "suggestedExercise", alias = "Suggested")]
    pub suggested: String,
    #[serde(alias = "Weight", deserialize_with = "deserialize_weight")]
    pub weight: f64,
    /// Always set×rep notation (`3x12`), never a bare number
    #[serde(alias = "Volume")]
    pub volume: String,
    #[serde(
        rename = "intensityMarker",
        alias = "rir",
        alias = "RIR",
        alias = "intensity",
        default = "default_intensity"
    )]
    pub intensity: String,
}

// ============================================================================
// Chat Directive
// ============================================================================

/// The only directive action the engine understands
pub const CREATE_PROGRAM_ACTION: &str = "create_program";

/// A structured "create a program" instruction embedded in otherwise
/// free-text chat output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatDirective {
    pub action: String,
    #[serde(rename = "workoutDays", alias = "workout_days")]
    pub workout_days: u8,
    pub goal: Goal,
}

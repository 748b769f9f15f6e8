// ABOUTME: Prompt construction for program generation, feedback, and chat interactions
// ABOUTME: Encodes the hard day-count constraint redundantly because the model ignores it when stated once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Prompt Builders
//!
//! Deterministic instruction templates for the three model interactions.
//! Everything here is a pure function of its inputs plus the supplied
//! catalog/reference data; no prompt builder performs I/O.
//!
//! The program template repeats the requested day count several times in
//! several phrasings. The template-following model has a strong bias toward
//! emitting three days regardless of instruction, and a single statement of
//! the constraint is demonstrably not enough. The assembler still validates
//! the day count after recovery; the redundancy here just raises the hit
//! rate of the first attempt.

use crate::models::{
    ExerciseCatalogEntry, ExperienceTier, FeedbackSignal, Gender, Goal, ProgramRequest,
};

/// GymMate coach persona and directive sub-schema, loaded at compile time
pub const COACH_SYSTEM_PROMPT: &str = include_str!("gymmate_system.md");

/// Get the system prompt for conversational coach interactions
///
/// Contains the persona instructions plus the exact conditions under which
/// the model must embed a `create_program` directive block versus replying
/// with ordinary prose.
#[must_use]
pub const fn get_coach_system_prompt() -> &'static str {
    COACH_SYSTEM_PROMPT
}

/// Split-structure guidance for a given weekly day count
fn split_guidance(workout_days: u8) -> &'static str {
    match workout_days {
        1 => "- 1 day: one full body session covering all major movement patterns",
        2 => "- 2 days: full body both days, alternating exercise selection",
        3 => "- 3 days: full body every day",
        4 => "- 4 days: Upper/Lower split",
        5 => "- 5 days: Push/Pull/Legs + Upper/Lower",
        6 => "- 6 days: Push/Pull/Legs/Push/Pull/Legs",
        _ => "- 7 days: Push/Pull/Legs twice plus one light full body day",
    }
}

fn gender_emphasis(gender: Gender) -> &'static str {
    match gender {
        Gender::Female => "more lower-body volume",
        Gender::Male => "more upper-body volume",
    }
}

fn goal_emphasis(goal: Goal) -> &'static str {
    match goal {
        Goal::MuscleGain => "heavier loads, lower rep ranges",
        Goal::FatLoss => "moderate loads, higher rep ranges",
    }
}

fn tier_emphasis(tier: ExperienceTier) -> &'static str {
    match tier {
        ExperienceTier::Beginner => "simple, easy-to-learn movements",
        ExperienceTier::Intermediate | ExperienceTier::Advanced => {
            "complex movements are appropriate"
        }
    }
}

fn to_json(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_owned())
}

/// Build the program generation prompt.
///
/// Embeds the exact requested day count multiple times, the literal output
/// schema, and restricts exercise choice to the supplied catalog subset.
#[must_use]
pub fn program_prompt(request: &ProgramRequest, catalog: &[ExerciseCatalogEntry]) -> String {
    let days = request.workout_days;
    let catalog_json = to_json(&catalog);
    let focus_line = request.focus_area.as_deref().map_or_else(String::new, |area| {
        format!("- Focus area: {area} (give this area one extra exercise per relevant day)\n")
    });

    format!(
        r#"You are the GymMate AI coach. Build a personalized training program for the user below.

!!!!! CRITICAL: THE USER REQUESTED A {days}-DAY PROGRAM. PRODUCE EXACTLY {days} DAYS. NOT 3 DAYS, {days} DAYS! !!!!!

IF YOU PRODUCE ANY NUMBER OF DAYS OTHER THAN {days}, THE OUTPUT IS WRONG.

User profile:
- Gender: {gender} ({gender_note})
- Experience: {tier} ({tier_note})
- Goal: {goal} ({goal_note})
- TRAINING DAY COUNT: {days} DAYS (PRODUCE EXACTLY THIS MANY DAY ENTRIES!)
{focus_line}
Program structure for {days} days:
{split}

Produce output that follows this JSON format exactly. Return ONLY JSON, with no other text:

{{
  "program": {{
    "Monday": [
      {{"name": "Squats", "sets": 3, "reps": "8-10", "rir": "2-3"}},
      {{"name": "Bench Press", "sets": 4, "reps": "6-8", "rir": "2-3"}}
    ],
    "Wednesday": [
      {{"name": "Deadlift", "sets": 3, "reps": "5-8", "rir": "2-3"}}
    ]
  }}
}}

RULES:
1. PRODUCE EXACTLY {days} DAY ENTRIES IN "program" - NO MORE, NO FEWER!
2. Choose exercises ONLY from the catalog below.
3. Pick exercises that suit the {goal} goal.
4. Match the {tier} experience level.
5. Structure the program for a {gender} user.
6. Every exercise needs the name, sets, reps, and rir fields.
7. Return ONLY the JSON document. No explanation, no greeting, no markdown.

Exercise catalog for this experience tier:
{catalog_json}
"#,
        days = days,
        gender = request.gender,
        gender_note = gender_emphasis(request.gender),
        tier = request.experience,
        tier_note = tier_emphasis(request.experience),
        goal = request.goal,
        goal_note = goal_emphasis(request.goal),
        focus_line = focus_line,
        split = split_guidance(days),
        catalog_json = catalog_json,
    )
}

/// Build the feedback-to-recommendation prompt.
///
/// Embeds the prior prescription, the feedback signal, and the progression
/// reference records verbatim; specifies the single-exercise recommendation
/// schema.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn feedback_prompt(
    exercise: &str,
    volume: &str,
    intensity: &str,
    weight: f64,
    signal: &FeedbackSignal,
    tier: ExperienceTier,
    progression_reference: &[serde_json::Value],
    catalog: &[ExerciseCatalogEntry],
) -> String {
    let reference_json = to_json(&progression_reference);
    let catalog_json = to_json(&catalog);

    format!(
        r#"You are the GymMate AI coach. Based on the user's exercise feedback, produce one adjustment recommendation consistent with the progression reference below.

Return only the necessary change in the JSON format below. The suggestion may be a different exercise, or the same exercise with different sets and reps.
If the incoming prescription is a range such as 3x10-15, the user has just started the program; progress reps within the range before touching the load. When the bottom or top of the range is reached, the weight moves by one increment instead.
NOTE: if you replace the exercise with another one, give it a fresh set and rep RANGE the way a newly created program would.
Example: if Bench Press must change -> suggest Dumbbell Press with volume 3x8-12.

{{
  "recommendation": {{
    "original": "{exercise}",
    "suggested": "a replacement exercise, or {exercise} again to keep it",
    "weight": 0.0,
    "volume": "3x12",
    "rir": "1-2"
  }}
}}

Reply ONLY with this structure. No explanation, no analysis, no extra text.

Experience level: {tier}
Exercise, volume, intensity, and weight (kg): {exercise}, {volume}, {intensity}, {weight}
Completed as prescribed: {achieved}
Joint pain: {joint_pain}/5
Pump: {pump}/5

Progression reference:
{reference_json}

Exercise catalog:
{catalog_json}
"#,
        exercise = exercise,
        tier = tier,
        volume = volume,
        intensity = intensity,
        weight = weight,
        achieved = signal.achieved,
        joint_pain = signal.joint_pain,
        pump = signal.pump_rating,
        reference_json = reference_json,
        catalog_json = catalog_json,
    )
}

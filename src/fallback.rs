// ABOUTME: Hand-authored per-tier fallback programs used when generation is unavailable or invalid
// ABOUTME: Selection truncates to the requested day count and never pads beyond authored content
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 GymMate AI

//! # Fallback Program Catalog
//!
//! Static, hand-authored multi-day programs per experience tier. Loaded once
//! at startup and read-only afterwards; this is the only process-wide state
//! in the engine.
//!
//! Selection truncates the authored base sequence to the requested day
//! count. It never pads: no authored content exists beyond the catalog, and
//! inventing days here would defeat the point of a trusted fallback. A
//! request for more days than authored is reported to the assembler as a
//! shortfall.

use std::sync::LazyLock;

use crate::models::{ExercisePrescription, ExperienceTier, GeneratedProgram};

fn day(label: &str, exercises: &[(&str, u32, &str, &str)]) -> (String, Vec<ExercisePrescription>) {
    (
        label.to_owned(),
        exercises
            .iter()
            .map(|(name, sets, reps, rir)| ExercisePrescription::new(*name, *sets, *reps, *rir))
            .collect(),
    )
}

fn build(days: &[(String, Vec<ExercisePrescription>)]) -> GeneratedProgram {
    let mut program = GeneratedProgram::new();
    for (label, exercises) in days {
        program.push_day(label.clone(), exercises.clone());
    }
    program
}

static BEGINNER_BASE: LazyLock<GeneratedProgram> = LazyLock::new(|| {
    build(&[
        day(
            "Day 1 - Full Body",
            &[
                ("Squat", 3, "8-12", "2-3"),
                ("Bench Press", 3, "8-12", "2-3"),
                ("Bent-over Row", 3, "8-12", "2-3"),
                ("Overhead Press", 3, "8-12", "2-3"),
                ("Plank", 3, "30-60 sec", "1-2"),
            ],
        ),
        day(
            "Day 2 - Full Body",
            &[
                ("Deadlift", 3, "5-8", "2-3"),
                ("Dumbbell Press", 3, "8-12", "2-3"),
                ("Lat Pulldown", 3, "8-12", "1-2"),
                ("Leg Press", 3, "12-15", "1-2"),
                ("Bicep Curl", 3, "10-15", "0-1"),
            ],
        ),
        day(
            "Day 3 - Full Body",
            &[
                ("Romanian Deadlift", 3, "8-12", "2-3"),
                ("Incline Dumbbell Press", 3, "8-12", "2-3"),
                ("Seated Row", 3, "8-12", "1-2"),
                ("Leg Curl", 3, "10-15", "1-2"),
                ("Tricep Extension", 3, "10-15", "0-1"),
            ],
        ),
    ])
});

static INTERMEDIATE_BASE: LazyLock<GeneratedProgram> = LazyLock::new(|| {
    build(&[
        day(
            "Day 1 - Upper Body",
            &[
                ("Bench Press", 4, "6-10", "2-3"),
                ("Bent-over Row", 4, "6-10", "2-3"),
                ("Overhead Press", 3, "8-12", "2-3"),
                ("Lat Pulldown", 3, "8-12", "1-2"),
                ("Dips", 3, "8-15", "1-2"),
                ("Barbell Curl", 3, "10-15", "0-1"),
            ],
        ),
        day(
            "Day 2 - Lower Body",
            &[
                ("Squat", 4, "6-10", "2-3"),
                ("Romanian Deadlift", 4, "8-12", "2-3"),
                ("Leg Press", 3, "12-20", "1-2"),
                ("Leg Curl", 3, "10-15", "1-2"),
                ("Calf Raise", 4, "15-20", "0-1"),
                ("Plank", 3, "60-90 sec", "1-2"),
            ],
        ),
        day(
            "Day 3 - Upper Body",
            &[
                ("Incline Dumbbell Press", 4, "8-12", "2-3"),
                ("Pull-ups", 4, "5-12", "2-3"),
                ("Dumbbell Shoulder Press", 3, "8-12", "2-3"),
                ("Seated Row", 3, "8-12", "1-2"),
                ("Close-grip Bench Press", 3, "8-12", "1-2"),
                ("Hammer Curl", 3, "10-15", "0-1"),
            ],
        ),
        day(
            "Day 4 - Lower Body + Core",
            &[
                ("Deadlift", 4, "5-8", "2-3"),
                ("Front Squat", 3, "8-12", "2-3"),
                ("Walking Lunges", 3, "12-16", "1-2"),
                ("Leg Extension", 3, "12-20", "1-2"),
                ("Russian Twists", 3, "20-30", "0-1"),
                ("Dead Bug", 3, "10-15", "1-2"),
            ],
        ),
    ])
});

static ADVANCED_BASE: LazyLock<GeneratedProgram> = LazyLock::new(|| {
    build(&[
        day(
            "Day 1 - Chest + Triceps",
            &[
                ("Bench Press", 5, "4-8", "2-3"),
                ("Incline Dumbbell Press", 4, "6-10", "2-3"),
                ("Chest Fly", 3, "10-15", "1-2"),
                ("Close-grip Bench Press", 4, "6-10", "2-3"),
                ("Tricep Dips", 3, "8-15", "1-2"),
                ("Overhead Tricep Extension", 3, "10-15", "0-1"),
            ],
        ),
        day(
            "Day 2 - Back + Biceps",
            &[
                ("Deadlift", 5, "4-8", "2-3"),
                ("Pull-ups", 4, "6-12", "2-3"),
                ("Bent-over Row", 4, "6-10", "2-3"),
                ("Lat Pulldown", 3, "8-12", "1-2"),
                ("Barbell Curl", 4, "8-12", "1-2"),
                ("Hammer Curl", 3, "10-15", "0-1"),
            ],
        ),
        day(
            "Day 3 - Legs",
            &[
                ("Squat", 5, "4-8", "2-3"),
                ("Romanian Deadlift", 4, "6-10", "2-3"),
                ("Bulgarian Split Squat", 3, "8-12", "2-3"),
                ("Leg Curl", 4, "10-15", "1-2"),
                ("Leg Extension", 3, "12-20", "1-2"),
                ("Calf Raise", 4, "15-25", "0-1"),
            ],
        ),
        day(
            "Day 4 - Shoulders + Core",
            &[
                ("Overhead Press", 5, "4-8", "2-3"),
                ("Lateral Raise", 4, "10-15", "1-2"),
                ("Rear Delt Fly", 4, "12-20", "1-2"),
                ("Upright Row", 3, "8-12", "2-3"),
                ("Plank", 4, "60-120 sec", "1-2"),
                ("Russian Twists", 3, "20-40", "0-1"),
            ],
        ),
        day(
            "Day 5 - Upper Power",
            &[
                ("Power Clean", 5, "3-5", "3-4"),
                ("Push Press", 4, "4-6", "2-3"),
                ("Weighted Pull-ups", 4, "4-8", "2-3"),
                ("Dumbbell Snatch", 3, "5-8", "2-3"),
                ("Battle Ropes", 3, "30 sec", "1-2"),
                ("Burpees", 3, "8-15", "1-2"),
            ],
        ),
    ])
});

/// The authored base sequence for a tier
#[must_use]
pub fn base_sequence(tier: ExperienceTier) -> &'static GeneratedProgram {
    match tier {
        ExperienceTier::Beginner => &BEGINNER_BASE,
        ExperienceTier::Intermediate => &INTERMEDIATE_BASE,
        ExperienceTier::Advanced => &ADVANCED_BASE,
    }
}

/// Number of authored days for a tier
#[must_use]
pub fn authored_len(tier: ExperienceTier) -> usize {
    base_sequence(tier).day_count()
}

/// Select the fallback program for a tier, truncated to `workout_days`.
///
/// The result has `min(workout_days, authored_len(tier))` days; the caller
/// reports a shortfall when that is fewer than requested.
#[must_use]
pub fn select(tier: ExperienceTier, workout_days: usize) -> GeneratedProgram {
    base_sequence(tier).truncated(workout_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authored_lengths() {
        assert_eq!(authored_len(ExperienceTier::Beginner), 3);
        assert_eq!(authored_len(ExperienceTier::Intermediate), 4);
        assert_eq!(authored_len(ExperienceTier::Advanced), 5);
    }

    #[test]
    fn test_select_truncates_never_pads() {
        let two = select(ExperienceTier::Beginner, 2);
        assert_eq!(two.day_count(), 2);

        let six = select(ExperienceTier::Beginner, 6);
        assert_eq!(six.day_count(), 3);
    }

    #[test]
    fn test_every_authored_day_has_exercises() {
        for tier in [
            ExperienceTier::Beginner,
            ExperienceTier::Intermediate,
            ExperienceTier::Advanced,
        ] {
            for (label, exercises) in base_sequence(tier).days() {
                assert!(!exercises.is_empty(), "day '{label}' has no exercises");
            }
        }
    }
}

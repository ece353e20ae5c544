// src/presets.rs
//! Built-in workout templates, grouped by training goal. Selecting one
//! produces a [`WorkoutTemplate`] that mounts like any other import.

use std::fmt;

use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::models::ExerciseCategory::{Bodyweight, Cable, Cardio, FreeWeight};
use crate::models::{ExerciseCategory, TemplateExercise, WorkoutTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Goal {
    Strength,
    Endurance,
    Aesthetics,
    Overall,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Strength => "Strength",
            Goal::Endurance => "Endurance",
            Goal::Aesthetics => "Aesthetics",
            Goal::Overall => "Overall",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parses a goal name case-insensitively.
pub fn parse_goal(name: &str) -> Option<Goal> {
    let trimmed = name.trim();
    Goal::iter().find(|g| g.as_str().eq_ignore_ascii_case(trimmed))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetExercise {
    pub name: &'static str,
    pub sets: usize,
    /// Target rep count, or minutes for cardio. Shown in listings only;
    /// mounted sets start blank.
    pub reps: i64,
    pub category: ExerciseCategory,
    pub is_unilateral: bool,
    pub notes: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetWorkout {
    pub name: &'static str,
    pub description: &'static str,
    pub goal: Goal,
    pub exercises: &'static [PresetExercise],
}

impl PresetWorkout {
    /// Converts the preset into the standard import shape: set counts
    /// only, expanded to blank sets at mount.
    pub fn to_template(&self) -> WorkoutTemplate {
        WorkoutTemplate {
            name: Some(self.name.to_string()),
            exercises: self
                .exercises
                .iter()
                .map(|e| TemplateExercise {
                    name: e.name.to_string(),
                    category: Some(e.category),
                    is_unilateral: e.is_unilateral,
                    notes: e.notes.map(str::to_string),
                    sets: e.sets,
                })
                .collect(),
        }
    }
}

pub const PRESET_WORKOUTS: &[PresetWorkout] = &[
    PresetWorkout {
        name: "Full Body Power",
        description: "Compound movements to build raw strength.",
        goal: Goal::Strength,
        exercises: &[
            PresetExercise { name: "Barbell Squat", sets: 5, reps: 5, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Bench Press", sets: 5, reps: 5, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Deadlift", sets: 3, reps: 5, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Overhead Press", sets: 3, reps: 8, category: FreeWeight, is_unilateral: false, notes: None },
        ],
    },
    PresetWorkout {
        name: "Upper Body Strength",
        description: "Focus on pushing and pulling strength.",
        goal: Goal::Strength,
        exercises: &[
            PresetExercise { name: "Bench Press", sets: 4, reps: 6, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Bent Over Row", sets: 4, reps: 6, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Pull Ups", sets: 3, reps: 8, category: Bodyweight, is_unilateral: false, notes: None },
            PresetExercise { name: "Dumbbell Shoulder Press", sets: 3, reps: 8, category: FreeWeight, is_unilateral: false, notes: None },
        ],
    },
    PresetWorkout {
        name: "High Intensity Circuit",
        description: "Keep the heart rate up with minimal rest.",
        goal: Goal::Endurance,
        exercises: &[
            PresetExercise { name: "Jump Squats", sets: 4, reps: 20, category: Bodyweight, is_unilateral: false, notes: None },
            PresetExercise { name: "Push Ups", sets: 4, reps: 15, category: Bodyweight, is_unilateral: false, notes: None },
            PresetExercise { name: "Mountain Climbers", sets: 4, reps: 30, category: Cardio, is_unilateral: false, notes: None },
            PresetExercise { name: "Burpees", sets: 3, reps: 12, category: Bodyweight, is_unilateral: false, notes: None },
        ],
    },
    PresetWorkout {
        name: "Cardio & Core",
        description: "Running mixed with core stability.",
        goal: Goal::Endurance,
        exercises: &[
            PresetExercise { name: "Running (Treadmill)", sets: 1, reps: 20, category: Cardio, is_unilateral: false, notes: Some("20 minutes steady pace") },
            PresetExercise { name: "Plank", sets: 3, reps: 60, category: Bodyweight, is_unilateral: false, notes: Some("60 seconds") },
            PresetExercise { name: "Russian Twists", sets: 3, reps: 20, category: Bodyweight, is_unilateral: false, notes: None },
        ],
    },
    PresetWorkout {
        name: "Push Hypertrophy",
        description: "Chest, shoulders, and triceps focus.",
        goal: Goal::Aesthetics,
        exercises: &[
            PresetExercise { name: "Incline Dumbbell Press", sets: 4, reps: 10, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Lateral Raises", sets: 4, reps: 15, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Tricep Pushdowns", sets: 3, reps: 12, category: Cable, is_unilateral: false, notes: None },
            PresetExercise { name: "Cable Flys", sets: 3, reps: 15, category: Cable, is_unilateral: false, notes: None },
        ],
    },
    PresetWorkout {
        name: "Pull Hypertrophy",
        description: "Back and biceps focus.",
        goal: Goal::Aesthetics,
        exercises: &[
            PresetExercise { name: "Lat Pulldown", sets: 4, reps: 12, category: Cable, is_unilateral: false, notes: None },
            PresetExercise { name: "Seated Cable Row", sets: 4, reps: 12, category: Cable, is_unilateral: false, notes: None },
            PresetExercise { name: "Face Pulls", sets: 3, reps: 15, category: Cable, is_unilateral: false, notes: None },
            PresetExercise { name: "Barbell Curls", sets: 3, reps: 10, category: FreeWeight, is_unilateral: false, notes: None },
        ],
    },
    PresetWorkout {
        name: "Balanced Full Body",
        description: "A mix of strength and conditioning.",
        goal: Goal::Overall,
        exercises: &[
            PresetExercise { name: "Goblet Squat", sets: 3, reps: 12, category: FreeWeight, is_unilateral: false, notes: None },
            PresetExercise { name: "Push Ups", sets: 3, reps: 15, category: Bodyweight, is_unilateral: false, notes: None },
            PresetExercise { name: "Dumbbell Rows", sets: 3, reps: 12, category: FreeWeight, is_unilateral: true, notes: None },
            PresetExercise { name: "Plank", sets: 3, reps: 45, category: Bodyweight, is_unilateral: false, notes: Some("45 seconds") },
        ],
    },
];

/// Presets suggested for a goal: the goal's own plus the Overall ones
/// (just the Overall ones when that is the goal).
pub fn suggested_for(goal: Goal) -> Vec<&'static PresetWorkout> {
    if goal == Goal::Overall {
        return PRESET_WORKOUTS.iter().filter(|p| p.goal == Goal::Overall).collect();
    }
    let mut suggested: Vec<&'static PresetWorkout> =
        PRESET_WORKOUTS.iter().filter(|p| p.goal == goal).collect();
    suggested.extend(PRESET_WORKOUTS.iter().filter(|p| p.goal == Goal::Overall));
    suggested
}

/// Looks a preset up by name, case-insensitively.
pub fn find(name: &str) -> Option<&'static PresetWorkout> {
    let trimmed = name.trim();
    PRESET_WORKOUTS.iter().find(|p| p.name.eq_ignore_ascii_case(trimmed))
}

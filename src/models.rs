// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Generates a fresh opaque record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Which measurement fields are authoritative for an exercise.
/// `Cardio` switches a set to distance/time; everything else is weight/reps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum ExerciseCategory {
    #[serde(rename = "Free Weight")]
    FreeWeight,
    Cable,
    Machine,
    Bodyweight,
    Cardio,
    Other,
}

impl ExerciseCategory {
    /// Canonical display/storage string for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseCategory::FreeWeight => "Free Weight",
            ExerciseCategory::Cable => "Cable",
            ExerciseCategory::Machine => "Machine",
            ExerciseCategory::Bodyweight => "Bodyweight",
            ExerciseCategory::Cardio => "Cardio",
            ExerciseCategory::Other => "Other",
        }
    }
}

impl fmt::Display for ExerciseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parses a category name case-insensitively, accepting a hyphenated form
/// ("free-weight") as well as the canonical one.
pub fn parse_category(name: &str) -> Option<ExerciseCategory> {
    let trimmed = name.trim();
    ExerciseCategory::iter().find(|c| {
        c.as_str().eq_ignore_ascii_case(trimmed)
            || c.as_str().replace(' ', "-").eq_ignore_ascii_case(trimmed)
    })
}

/// One logged set. All numeric fields default to 0 and are never negative;
/// which of them matter depends on the owning exercise's category and
/// unilateral flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSet {
    pub id: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub reps: i64,
    #[serde(default)]
    pub reps_left: i64,
    #[serde(default)]
    pub reps_right: i64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub completed: bool,
}

impl ExerciseSet {
    /// A blank, zero-valued, incomplete set with a fresh id.
    pub fn new() -> Self {
        ExerciseSet {
            id: new_id(),
            weight: 0.0,
            reps: 0,
            reps_left: 0,
            reps_right: 0,
            distance: 0.0,
            time: 0.0,
            completed: false,
        }
    }
}

impl Default for ExerciseSet {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ExerciseCategory>,
    #[serde(default)]
    pub is_unilateral: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub sets: Vec<ExerciseSet>,
}

impl Exercise {
    /// A new exercise with exactly one blank set.
    pub fn new(name: &str, category: Option<ExerciseCategory>, is_unilateral: bool) -> Self {
        Exercise {
            id: new_id(),
            name: name.trim().to_string(),
            category,
            is_unilateral,
            notes: None,
            sets: vec![ExerciseSet::new()],
        }
    }

    pub fn is_cardio(&self) -> bool {
        self.category == Some(ExerciseCategory::Cardio)
    }
}

/// A finished (or being-edited) workout as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub name: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub exercises: Vec<Exercise>,
}

/// Derived (never stored) entry for the exercise picker: one row per
/// distinct historical exercise name.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownExercise {
    pub name: String,
    pub category: Option<ExerciseCategory>,
    pub is_unilateral: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of the assistant conversation. The session engine only clears
/// these; the chat surface owns writing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Import contract for preset selection and plan files: exercises carry a
/// set *count*, expanded into blank sets at mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exercises: Vec<TemplateExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ExerciseCategory>,
    #[serde(default)]
    pub is_unilateral: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "default_template_sets")]
    pub sets: usize,
}

fn default_template_sets() -> usize {
    3
}

impl TemplateExercise {
    /// Expands the set count into that many blank sets.
    pub fn expand(&self) -> Exercise {
        Exercise {
            id: new_id(),
            name: self.name.trim().to_string(),
            category: self.category,
            is_unilateral: self.is_unilateral,
            notes: self.notes.clone(),
            sets: (0..self.sets).map(|_| ExerciseSet::new()).collect(),
        }
    }
}

// src/history.rs
//! Ghost-data resolution: pure lookups over a user's workout history that
//! feed set placeholders, completion autofill and the stats display.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::{Exercise, ExerciseSet, KnownExercise, WorkoutSession};

/// Display strings for the stats panel of one exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseStats {
    /// Best set of the most recent session, e.g. `"135lbs x 5"`.
    pub last: String,
    /// All-time personal record, e.g. `"225lbs x 3"`.
    pub pr: String,
}

/// One workout's contribution to an exercise's progress chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPoint {
    pub date: DateTime<Utc>,
    /// Max weight lifted that day, or max distance for cardio.
    pub max_value: f64,
    pub volume: f64,
    pub best_set: ExerciseSet,
}

fn matches_name(exercise: &Exercise, clean: &str) -> bool {
    exercise.name.trim().to_lowercase() == clean
}

// Left-side reps stand in for plain reps when present (unilateral sets
// log per side); zero falls back to the bilateral count.
fn display_reps(set: &ExerciseSet) -> i64 {
    if set.reps_left != 0 {
        set.reps_left
    } else {
        set.reps
    }
}

/// The set array of the most recent workout containing `name`
/// (case-insensitive, trimmed), skipping `exclude_workout_id` so an edit
/// session never suggests values from itself. These are the ghost values.
pub fn last_sets_for(
    workouts: &[WorkoutSession],
    name: &str,
    exclude_workout_id: Option<&str>,
) -> Option<Vec<ExerciseSet>> {
    let clean = name.trim().to_lowercase();
    if clean.is_empty() {
        return None;
    }
    let mut candidates: Vec<&WorkoutSession> = workouts
        .iter()
        .filter(|w| exclude_workout_id.map_or(true, |id| id != w.id))
        .collect();
    candidates.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let last_workout = candidates
        .iter()
        .find(|w| w.exercises.iter().any(|e| matches_name(e, &clean)))?;
    let exercise = last_workout
        .exercises
        .iter()
        .find(|e| matches_name(e, &clean))?;
    Some(exercise.sets.clone())
}

/// Last-session and personal-record display strings for `name`, or `None`
/// when no workout contains the exercise. Either string may be `"N/A"`
/// when no completed sets qualify.
pub fn stats_for(workouts: &[WorkoutSession], name: &str) -> Option<ExerciseStats> {
    let clean = name.trim().to_lowercase();
    if clean.is_empty() {
        return None;
    }
    let mut relevant: Vec<&WorkoutSession> = workouts
        .iter()
        .filter(|w| w.exercises.iter().any(|e| matches_name(e, &clean)))
        .collect();
    relevant.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    if relevant.is_empty() {
        return None;
    }

    let last_exercise = relevant[0].exercises.iter().find(|e| matches_name(e, &clean));
    let is_cardio = last_exercise.map_or(false, Exercise::is_cardio);
    let is_unilateral = last_exercise.map_or(false, |e| e.is_unilateral);

    let mut last = String::from("N/A");
    if let Some(exercise) = last_exercise {
        let completed: Vec<&ExerciseSet> = exercise.sets.iter().filter(|s| s.completed).collect();
        if !completed.is_empty() {
            if is_cardio {
                let mut best = completed[0];
                for &set in &completed[1..] {
                    if set.distance > best.distance {
                        best = set;
                    }
                }
                last = format!("{}mi / {}m", best.distance, best.time);
            } else {
                let mut best = completed[0];
                for &set in &completed[1..] {
                    if set.weight > best.weight
                        || (set.weight == best.weight && set.reps > best.reps)
                    {
                        best = set;
                    }
                }
                let reps = if is_unilateral {
                    display_reps(best)
                } else {
                    best.reps
                };
                last = format!("{}lbs x {}", best.weight, reps);
            }
        }
    }

    let pr = if is_cardio {
        let mut max_distance = 0.0_f64;
        let mut associated_time = 0.0_f64;
        for workout in &relevant {
            let exercise = match workout.exercises.iter().find(|e| matches_name(e, &clean)) {
                Some(e) => e,
                None => continue,
            };
            for set in &exercise.sets {
                if set.completed && set.distance > max_distance {
                    max_distance = set.distance;
                    associated_time = set.time;
                }
            }
        }
        if max_distance > 0.0 {
            format!("{}mi / {}m", max_distance, associated_time)
        } else {
            String::from("N/A")
        }
    } else {
        let mut max_weight = 0.0_f64;
        let mut max_weight_reps = 0_i64;
        for workout in &relevant {
            let exercise = match workout.exercises.iter().find(|e| matches_name(e, &clean)) {
                Some(e) => e,
                None => continue,
            };
            for set in &exercise.sets {
                if !set.completed || set.weight <= 0.0 {
                    continue;
                }
                if set.weight > max_weight {
                    max_weight = set.weight;
                    max_weight_reps = display_reps(set);
                } else if set.weight == max_weight {
                    let reps = display_reps(set);
                    if reps > max_weight_reps {
                        max_weight_reps = reps;
                    }
                }
            }
        }
        if max_weight > 0.0 {
            format!("{}lbs x {}", max_weight, max_weight_reps)
        } else {
            String::from("N/A")
        }
    };

    Some(ExerciseStats { last, pr })
}

/// One chart point per workout containing `name`, oldest first. Strength
/// volume sums weight times effective reps (left + right when unilateral)
/// over completed sets; cardio volume sums distance. Workouts whose max
/// value stays zero are skipped.
pub fn exercise_history(workouts: &[WorkoutSession], name: &str) -> Vec<HistoryPoint> {
    let clean = name.trim().to_lowercase();
    if clean.is_empty() {
        return Vec::new();
    }
    let mut history = Vec::new();
    for workout in workouts {
        let exercise = match workout.exercises.iter().find(|e| matches_name(e, &clean)) {
            Some(e) => e,
            None => continue,
        };
        if exercise.sets.is_empty() {
            continue;
        }
        let is_cardio = exercise.is_cardio();
        let is_unilateral = exercise.is_unilateral;

        let mut max_value = 0.0_f64;
        let mut best_set = &exercise.sets[0];
        let mut volume = 0.0_f64;
        for set in &exercise.sets {
            if !set.completed {
                continue;
            }
            if is_cardio {
                volume += set.distance;
                if set.distance > max_value {
                    max_value = set.distance;
                    best_set = set;
                }
            } else {
                let reps = if is_unilateral {
                    (set.reps_left + set.reps_right) as f64
                } else {
                    set.reps as f64
                };
                volume += set.weight * reps;
                if set.weight > max_value {
                    max_value = set.weight;
                    best_set = set;
                }
            }
        }
        if max_value > 0.0 {
            history.push(HistoryPoint {
                date: workout.start_time,
                max_value,
                volume,
                best_set: best_set.clone(),
            });
        }
    }
    history.sort_by(|a, b| a.date.cmp(&b.date));
    history
}

/// Distinct exercise names across all history, first occurrence wins the
/// casing and category, hidden names excluded, sorted for the picker.
pub fn known_exercises(workouts: &[WorkoutSession], hidden: &[String]) -> Vec<KnownExercise> {
    let hidden_set: HashSet<String> = hidden.iter().map(|h| h.to_lowercase()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut known = Vec::new();
    for workout in workouts {
        for exercise in &workout.exercises {
            let clean_name = exercise.name.trim();
            if clean_name.is_empty() {
                continue;
            }
            let lower = clean_name.to_lowercase();
            if hidden_set.contains(&lower) || seen.contains(&lower) {
                continue;
            }
            seen.insert(lower);
            known.push(KnownExercise {
                name: clean_name.to_string(),
                category: exercise.category,
                is_unilateral: exercise.is_unilateral,
            });
        }
    }
    known.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    known
}

/// Plain-text summary of the five most recent workouts, the context block
/// handed to the workout assistant.
pub fn recent_workouts_context(workouts: &[WorkoutSession]) -> String {
    let recent = &workouts[..workouts.len().min(5)];
    if recent.is_empty() {
        return String::from("No previous workout history.");
    }
    let mut context = String::from("RECENT WORKOUT HISTORY:\n");
    for workout in recent {
        context.push_str(&format!(
            "\nWorkout: {} ({})\n",
            workout.name,
            workout.start_time.format("%-m/%-d/%Y")
        ));
        for exercise in &workout.exercises {
            let category = exercise.category.map_or("Free Weight", |c| c.as_str());
            context.push_str(&format!("  - {} ({}): ", exercise.name, category));
            let completed: Vec<String> = exercise
                .sets
                .iter()
                .filter(|s| s.completed)
                .map(|s| {
                    if exercise.is_cardio() {
                        format!("{}mi/{}m", s.distance, s.time)
                    } else if exercise.is_unilateral {
                        format!("{}lbs x (L:{} R:{})", s.weight, s.reps_left, s.reps_right)
                    } else {
                        format!("{}lbs x {}", s.weight, s.reps)
                    }
                })
                .collect();
            if completed.is_empty() {
                context.push_str("No sets completed.");
            } else {
                context.push_str(&completed.join(", "));
            }
            context.push('\n');
        }
    }
    context
}

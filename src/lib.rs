use anyhow::{bail, Context, Result};
// Use anyhow::Result as standard Result for the session layer
use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

// --- Declare modules ---
pub mod config;
pub mod draft;
pub mod history;
pub mod models;
pub mod presets;
pub mod store;
pub mod timer;

// --- Expose public types ---
pub use config::{get_config_path, load_config, save_config, Config, ConfigError};
pub use draft::{Autosave, RestTimerSnapshot, WorkoutDraft, AUTOSAVE_DEBOUNCE_MS};
pub use history::{ExerciseStats, HistoryPoint};
pub use models::{
    new_id,
    parse_category,
    ChatMessage,
    ChatRole,
    Exercise,
    ExerciseCategory,
    ExerciseSet,
    KnownExercise,
    TemplateExercise,
    WorkoutSession,
    WorkoutTemplate,
};
pub use presets::{parse_goal, Goal, PresetWorkout, PRESET_WORKOUTS};
pub use store::{get_db_path, Store, StoreError};
pub use timer::{RestTick, RestTimer, WorkoutTimer, DEFAULT_REST_SECS};

/// How an active session came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    /// Restored from a relevant saved draft.
    Draft,
    /// Loaded an already-finished workout for editing.
    Edit,
    /// Seeded from a template with the clock already running.
    Template,
    /// Fresh empty session.
    Blank,
}

/// A single typed update to one field of a set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetChange {
    Weight(f64),
    Reps(i64),
    RepsLeft(i64),
    RepsRight(i64),
    Distance(f64),
    Time(f64),
}

/// Outcome of one pass of the host's 1 Hz loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTick {
    pub rest: RestTick,
    /// True when a due draft write landed this tick.
    pub autosaved: bool,
}

/// Formats an elapsed-seconds value as `M:SS`.
#[must_use]
pub fn format_elapsed(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// The in-progress workout session: exercise list, workout clock, rest
/// countdown, ghost data caches and debounced draft persistence behind
/// one mutation surface.
///
/// Every operation takes the current instant explicitly; nothing in here
/// reads the system clock or any ambient state.
pub struct ActiveSession<'a> {
    store: &'a Store,
    user_id: String,
    edit_workout_id: Option<String>,
    workout_name: String,
    exercises: Vec<Exercise>,
    timer: WorkoutTimer,
    rest: RestTimer,
    autosave: Autosave,
    // Keyed by exercise id, refreshed whenever an exercise name changes.
    ghost_sets: HashMap<String, Vec<ExerciseSet>>,
    stats: HashMap<String, ExerciseStats>,
    exercises_expanded: HashMap<String, bool>,
    notes_expanded: HashMap<String, bool>,
    mode: MountMode,
}

impl<'a> ActiveSession<'a> {
    /// Starts or resumes a session. Initial state resolves in priority
    /// order: a relevant draft (its edit target equals `edit_workout_id`,
    /// both-absent included), then the stored workout being edited, then
    /// an imported template, then a blank session. An irrelevant draft is
    /// left untouched; the next save overwrites it.
    pub fn mount(
        store: &'a Store,
        user_id: &str,
        edit_workout_id: Option<&str>,
        template: Option<WorkoutTemplate>,
        now: DateTime<Utc>,
    ) -> ActiveSession<'a> {
        let rest_pref = store.rest_timer_preference(user_id);
        let draft = store.draft(user_id);
        let relevant = draft
            .as_ref()
            .map_or(false, |d| d.edit_workout_id.as_deref() == edit_workout_id);

        let mut session = ActiveSession {
            store,
            user_id: user_id.to_string(),
            edit_workout_id: edit_workout_id.map(str::to_string),
            workout_name: "New Workout".to_string(),
            exercises: Vec::new(),
            timer: WorkoutTimer::new(now),
            rest: RestTimer::new(rest_pref),
            autosave: Autosave::new(),
            ghost_sets: HashMap::new(),
            stats: HashMap::new(),
            exercises_expanded: HashMap::new(),
            notes_expanded: HashMap::new(),
            mode: MountMode::Blank,
        };

        if relevant {
            let draft = draft.expect("relevant draft present");
            session.workout_name = draft.workout_name;
            session.exercises = draft.exercises;
            session.exercises_expanded = draft.exercises_expanded;
            session.notes_expanded = draft.notes_expanded;
            session.timer = WorkoutTimer::restore(
                draft.start_time,
                draft.has_started,
                !draft.timer_paused,
                draft.timer_paused_at,
                draft.total_paused_ms,
            );
            // The countdown comes back from its absolute end time; one
            // that expired while the app was closed stays quiet.
            if let Some(snapshot) = draft.rest_timer {
                if snapshot.is_active {
                    session.rest = RestTimer::restore(rest_pref, snapshot.end_time, now);
                }
            }
            session.refresh_all_exercise_data();
            session.mode = MountMode::Draft;
            debug!(user = user_id, "restored draft session");
        } else if let Some(edit_id) = edit_workout_id {
            match store.workout_by_id(user_id, edit_id) {
                Some(existing) => {
                    session.workout_name = existing.name;
                    session.exercises = existing.exercises;
                    // Editing reopens with the clock stopped; elapsed
                    // shows wall time since the original start.
                    session.timer =
                        WorkoutTimer::restore(existing.start_time, true, false, None, 0);
                    session.expand_all();
                    session.refresh_all_exercise_data();
                    session.mode = MountMode::Edit;
                    debug!(user = user_id, workout = edit_id, "editing stored workout");
                }
                None => {
                    warn!(
                        user = user_id,
                        workout = edit_id,
                        "workout to edit not found, starting blank"
                    );
                    session.start_blank(now);
                }
            }
        } else if let Some(template) = template {
            if let Some(name) = template.name.as_deref().filter(|n| !n.is_empty()) {
                session.workout_name = name.to_string();
            }
            session.exercises = template
                .exercises
                .iter()
                .map(TemplateExercise::expand)
                .collect();
            session.expand_all();
            session.timer = WorkoutTimer::new(now);
            session.timer.start(now);
            session.refresh_all_exercise_data();
            session.mode = MountMode::Template;
            debug!(user = user_id, "seeded session from template");
        } else {
            session.start_blank(now);
        }

        session.autosave.schedule(now);
        session
    }

    fn start_blank(&mut self, now: DateTime<Utc>) {
        self.workout_name = format!("Workout {}", now.with_timezone(&Local).format("%-m/%-d/%Y"));
        self.timer = WorkoutTimer::new(now);
        self.mode = MountMode::Blank;
    }

    fn expand_all(&mut self) {
        for exercise in &self.exercises {
            self.exercises_expanded.insert(exercise.id.clone(), true);
            if exercise.notes.as_deref().is_some_and(|n| !n.is_empty()) {
                self.notes_expanded.insert(exercise.id.clone(), true);
            }
        }
    }

    // --- Accessors ---

    pub fn mode(&self) -> MountMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.workout_name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn edit_workout_id(&self) -> Option<&str> {
        self.edit_workout_id.as_deref()
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub const fn timer(&self) -> &WorkoutTimer {
        &self.timer
    }

    pub const fn rest(&self) -> &RestTimer {
        &self.rest
    }

    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.timer.elapsed_seconds(now)
    }

    /// Sets from the most recent prior session of this exercise, used
    /// for placeholder display and completion auto-fill.
    pub fn ghost_sets(&self, exercise_id: &str) -> Option<&[ExerciseSet]> {
        self.ghost_sets.get(exercise_id).map(Vec::as_slice)
    }

    pub fn stats(&self, exercise_id: &str) -> Option<&ExerciseStats> {
        self.stats.get(exercise_id)
    }

    pub fn is_expanded(&self, exercise_id: &str) -> bool {
        self.exercises_expanded
            .get(exercise_id)
            .copied()
            .unwrap_or(false)
    }

    pub fn notes_open(&self, exercise_id: &str) -> bool {
        self.notes_expanded
            .get(exercise_id)
            .copied()
            .unwrap_or(false)
    }

    /// Looks up an exercise in the current session.
    /// # Errors
    /// Returns an error if the exercise is not part of this session.
    pub fn exercise(&self, exercise_id: &str) -> Result<&Exercise> {
        self.exercises
            .iter()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| anyhow::anyhow!("Exercise not found in session: {exercise_id}"))
    }

    fn exercise_mut(&mut self, exercise_id: &str) -> Result<&mut Exercise> {
        self.exercises
            .iter_mut()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| anyhow::anyhow!("Exercise not found in session: {exercise_id}"))
    }

    // --- Ghost data upkeep ---

    fn refresh_all_exercise_data(&mut self) {
        let pairs: Vec<(String, String)> = self
            .exercises
            .iter()
            .map(|e| (e.id.clone(), e.name.clone()))
            .collect();
        for (id, name) in pairs {
            self.refresh_exercise_data(&id, &name);
        }
    }

    fn refresh_exercise_data(&mut self, exercise_id: &str, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        let workouts = self.store.workouts(&self.user_id);
        match history::stats_for(&workouts, name) {
            Some(stats) => {
                self.stats.insert(exercise_id.to_string(), stats);
            }
            None => {
                self.stats.remove(exercise_id);
            }
        }
        match history::last_sets_for(&workouts, name, self.edit_workout_id.as_deref()) {
            Some(sets) => {
                self.ghost_sets.insert(exercise_id.to_string(), sets);
            }
            None => {
                self.ghost_sets.remove(exercise_id);
            }
        }
    }

    // --- Mutations (each schedules a debounced draft write) ---

    pub fn set_name(&mut self, name: &str, now: DateTime<Utc>) {
        self.workout_name = name.to_string();
        self.autosave.schedule(now);
    }

    /// Appends an exercise with one blank set and fetches its ghost data.
    /// Adding the first exercise implicitly starts the workout clock.
    /// Returns the new exercise id.
    pub fn add_exercise(
        &mut self,
        name: &str,
        category: Option<ExerciseCategory>,
        is_unilateral: bool,
        now: DateTime<Utc>,
    ) -> String {
        self.timer.start(now);
        let exercise = Exercise::new(name, category, is_unilateral);
        let id = exercise.id.clone();
        let canonical = exercise.name.clone();
        self.exercises.push(exercise);
        self.exercises_expanded.insert(id.clone(), true);
        self.refresh_exercise_data(&id, &canonical);
        self.autosave.schedule(now);
        id
    }

    /// Renames an exercise and refreshes its ghost data and stats.
    /// # Errors
    /// Returns an error if the name is empty or the exercise is unknown.
    pub fn rename_exercise(
        &mut self,
        exercise_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            bail!("Exercise name cannot be empty.");
        }
        let exercise = self.exercise_mut(exercise_id)?;
        exercise.name = trimmed.to_string();
        let owned = trimmed.to_string();
        self.refresh_exercise_data(exercise_id, &owned);
        self.autosave.schedule(now);
        Ok(())
    }

    /// Sets (or clears, when blank) the free-text notes of an exercise.
    /// # Errors
    /// Returns an error if the exercise is unknown.
    pub fn set_exercise_notes(
        &mut self,
        exercise_id: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exercise = self.exercise_mut(exercise_id)?;
        if notes.trim().is_empty() {
            exercise.notes = None;
            self.notes_expanded.remove(exercise_id);
        } else {
            exercise.notes = Some(notes.to_string());
            self.notes_expanded.insert(exercise_id.to_string(), true);
        }
        self.autosave.schedule(now);
        Ok(())
    }

    /// # Errors
    /// Returns an error if the exercise is unknown.
    pub fn toggle_exercise_expanded(
        &mut self,
        exercise_id: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.exercise(exercise_id)?;
        let current = self.is_expanded(exercise_id);
        self.exercises_expanded
            .insert(exercise_id.to_string(), !current);
        self.autosave.schedule(now);
        Ok(())
    }

    /// Appends a set copying the previous one's values, unless ghost data
    /// exists at the new index; then the set starts blank so the ghost
    /// value shows through instead of a stale carry-over.
    /// # Errors
    /// Returns an error if the exercise is unknown.
    pub fn add_set(&mut self, exercise_id: &str, now: DateTime<Utc>) -> Result<()> {
        let exercise = self
            .exercises
            .iter_mut()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| anyhow::anyhow!("Exercise not found in session: {exercise_id}"))?;
        let new_index = exercise.sets.len();
        let has_ghost = self
            .ghost_sets
            .get(exercise_id)
            .is_some_and(|sets| new_index < sets.len());

        let new_set = if has_ghost {
            ExerciseSet::new()
        } else {
            exercise.sets.last().map_or_else(ExerciseSet::new, |previous| ExerciseSet {
                id: new_id(),
                completed: false,
                ..previous.clone()
            })
        };
        exercise.sets.push(new_set);
        self.autosave.schedule(now);
        Ok(())
    }

    /// Drops the last set. No-op when only one remains; an exercise keeps
    /// at least one set while it exists.
    /// # Errors
    /// Returns an error if the exercise is unknown.
    pub fn remove_last_set(&mut self, exercise_id: &str, now: DateTime<Utc>) -> Result<()> {
        let exercise = self.exercise_mut(exercise_id)?;
        if exercise.sets.len() > 1 {
            exercise.sets.pop();
            self.autosave.schedule(now);
        }
        Ok(())
    }

    /// # Errors
    /// Returns an error if the exercise is unknown.
    pub fn remove_exercise(&mut self, exercise_id: &str, now: DateTime<Utc>) -> Result<()> {
        let index = self
            .exercises
            .iter()
            .position(|e| e.id == exercise_id)
            .ok_or_else(|| anyhow::anyhow!("Exercise not found in session: {exercise_id}"))?;
        self.exercises.remove(index);
        self.ghost_sets.remove(exercise_id);
        self.stats.remove(exercise_id);
        self.exercises_expanded.remove(exercise_id);
        self.notes_expanded.remove(exercise_id);
        self.autosave.schedule(now);
        Ok(())
    }

    /// Applies one typed field update to a set.
    /// # Errors
    /// Returns an error on negative or non-finite values, or unknown ids.
    pub fn update_set(
        &mut self,
        exercise_id: &str,
        set_id: &str,
        change: SetChange,
        now: DateTime<Utc>,
    ) -> Result<()> {
        match change {
            SetChange::Weight(v) | SetChange::Distance(v) | SetChange::Time(v) => {
                if !v.is_finite() {
                    bail!("Value must be a finite number.");
                }
                if v < 0.0 {
                    bail!("Value cannot be negative.");
                }
            }
            SetChange::Reps(v) | SetChange::RepsLeft(v) | SetChange::RepsRight(v) => {
                if v < 0 {
                    bail!("Value cannot be negative.");
                }
            }
        }
        let exercise = self.exercise_mut(exercise_id)?;
        let set = exercise
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
            .ok_or_else(|| anyhow::anyhow!("Set not found: {set_id}"))?;
        match change {
            SetChange::Weight(v) => set.weight = v,
            SetChange::Reps(v) => set.reps = v,
            SetChange::RepsLeft(v) => set.reps_left = v,
            SetChange::RepsRight(v) => set.reps_right = v,
            SetChange::Distance(v) => set.distance = v,
            SetChange::Time(v) => set.time = v,
        }
        self.autosave.schedule(now);
        Ok(())
    }

    /// Flips a set's completed flag and returns the new state.
    ///
    /// Completing auto-fills still-zero fields from the same-index ghost
    /// set (distance and time for cardio, weight and reps otherwise,
    /// left/right reps when unilateral) and starts the rest countdown at
    /// its full duration. Un-completing only clears the flag; a running
    /// countdown keeps going.
    /// # Errors
    /// Returns an error if the exercise or set is unknown.
    pub fn toggle_set_complete(
        &mut self,
        exercise_id: &str,
        set_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let exercise_index = self
            .exercises
            .iter()
            .position(|e| e.id == exercise_id)
            .ok_or_else(|| anyhow::anyhow!("Exercise not found in session: {exercise_id}"))?;
        let set_index = self.exercises[exercise_index]
            .sets
            .iter()
            .position(|s| s.id == set_id)
            .ok_or_else(|| anyhow::anyhow!("Set not found: {set_id}"))?;
        let ghost = self
            .ghost_sets
            .get(exercise_id)
            .and_then(|sets| sets.get(set_index))
            .cloned();

        let exercise = &mut self.exercises[exercise_index];
        let is_cardio = exercise.is_cardio();
        let is_unilateral = exercise.is_unilateral;
        let set = &mut exercise.sets[set_index];

        if set.completed {
            set.completed = false;
            self.autosave.schedule(now);
            return Ok(false);
        }

        if let Some(ghost) = ghost {
            if is_cardio {
                if set.distance == 0.0 && ghost.distance != 0.0 {
                    set.distance = ghost.distance;
                }
                if set.time == 0.0 && ghost.time != 0.0 {
                    set.time = ghost.time;
                }
            } else {
                if set.weight == 0.0 && ghost.weight != 0.0 {
                    set.weight = ghost.weight;
                }
                if is_unilateral {
                    if set.reps_left == 0 && ghost.reps_left != 0 {
                        set.reps_left = ghost.reps_left;
                    }
                    if set.reps_right == 0 && ghost.reps_right != 0 {
                        set.reps_right = ghost.reps_right;
                    }
                } else if set.reps == 0 && ghost.reps != 0 {
                    set.reps = ghost.reps;
                }
            }
        }
        set.completed = true;
        self.rest.trigger();
        self.autosave.schedule(now);
        Ok(true)
    }

    // --- Timers ---

    /// Pauses or resumes the workout clock. The first press on a
    /// never-started session starts it.
    pub fn toggle_timer(&mut self, now: DateTime<Utc>) {
        self.timer.toggle(now);
        self.autosave.schedule(now);
    }

    /// Adjusts the default rest duration, persists it as the user's
    /// preference and shifts a running countdown by the same amount.
    /// Returns the new default.
    /// # Errors
    /// Returns an error if the preference cannot be persisted.
    pub fn adjust_rest(&mut self, delta: i64, now: DateTime<Utc>) -> Result<i64> {
        let duration = self.rest.adjust(delta);
        self.store
            .save_rest_timer_preference(&self.user_id, duration)
            .context("Failed to save rest timer preference")?;
        self.autosave.schedule(now);
        Ok(duration)
    }

    pub fn skip_rest(&mut self, now: DateTime<Utc>) {
        self.rest.skip();
        self.autosave.schedule(now);
    }

    /// One pass of the host's 1 Hz loop: advances the rest countdown and
    /// lands any due draft write. Countdown decrements alone do not
    /// reschedule the draft; the persisted absolute end time already
    /// covers them. Autosave failures are logged and swallowed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> SessionTick {
        let rest = self.rest.tick();
        if rest == RestTick::Finished {
            self.autosave.schedule(now);
        }
        let mut autosaved = false;
        if self.autosave.poll(now) {
            match self.write_draft(now) {
                Ok(()) => autosaved = true,
                Err(err) => warn!(error = %err, "draft autosave failed"),
            }
        }
        SessionTick { rest, autosaved }
    }

    // --- Persistence ---

    /// Writes the draft immediately, cancelling any pending debounce.
    /// # Errors
    /// Returns an error if the write fails.
    pub fn flush(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.autosave.cancel();
        self.write_draft(now)
            .context("Failed to save workout draft")?;
        Ok(())
    }

    fn write_draft(&self, now: DateTime<Utc>) -> Result<(), StoreError> {
        let draft = WorkoutDraft {
            edit_workout_id: self.edit_workout_id.clone(),
            workout_name: self.workout_name.clone(),
            start_time: self.timer.start_time(),
            has_started: self.timer.has_started(),
            exercises: self.exercises.clone(),
            timer_paused: !self.timer.is_running(),
            timer_paused_at: self.timer.paused_at(),
            total_paused_ms: self.timer.total_paused_ms(),
            notes_expanded: self.notes_expanded.clone(),
            exercises_expanded: self.exercises_expanded.clone(),
            rest_timer: if self.rest.is_active() {
                Some(RestTimerSnapshot {
                    is_active: true,
                    time_left: self.rest.seconds_left(),
                    duration: self.rest.duration(),
                    end_time: self.rest.end_time(now),
                })
            } else {
                None
            },
        };
        self.store.save_draft(&self.user_id, &draft)
    }

    /// Stamps the end time, persists the workout (overwriting the edited
    /// record or prepending a new one), then clears the draft and the
    /// chat history. Returns the stored session.
    /// # Errors
    /// Returns an error if any of the writes fail.
    pub fn finish(self, now: DateTime<Utc>) -> Result<WorkoutSession> {
        let workout = WorkoutSession {
            id: self.edit_workout_id.clone().unwrap_or_else(new_id),
            name: self.workout_name.clone(),
            start_time: self.timer.start_time(),
            end_time: Some(now),
            exercises: self.exercises,
        };
        self.store
            .save_workout(&self.user_id, &workout)
            .context("Failed to save finished workout")?;
        self.store
            .clear_draft(&self.user_id)
            .context("Failed to clear workout draft")?;
        self.store
            .clear_chat_history(&self.user_id)
            .context("Failed to clear chat history")?;
        debug!(user = %self.user_id, workout = %workout.id, "workout finished");
        Ok(workout)
    }

    /// Discards the session: clears the draft and the chat history
    /// without saving a workout. Confirmation is the caller's job.
    /// # Errors
    /// Returns an error if either delete fails.
    pub fn cancel(self) -> Result<()> {
        self.store
            .clear_draft(&self.user_id)
            .context("Failed to clear workout draft")?;
        self.store
            .clear_chat_history(&self.user_id)
            .context("Failed to clear chat history")?;
        debug!(user = %self.user_id, "workout cancelled");
        Ok(())
    }
}

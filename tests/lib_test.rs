use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ironlog_lib::{
    format_elapsed, history, new_id, parse_category, parse_goal, presets, ActiveSession,
    ChatMessage, ChatRole, Config, Exercise, ExerciseCategory, ExerciseSet, Goal, MountMode,
    RestTick, SetChange, Store, TemplateExercise, WorkoutDraft, WorkoutSession, WorkoutTemplate,
    DEFAULT_REST_SECS,
};

const USER: &str = "default";

// Helper function to create an in-memory store for testing
fn create_test_store() -> Result<Store> {
    Ok(Store::open_in_memory()?)
}

// Fixed instant so tests never depend on the wall clock
fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap()
}

fn at(seconds: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(seconds)
}

fn at_ms(ms: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(ms)
}

fn done_set(weight: f64, reps: i64) -> ExerciseSet {
    ExerciseSet {
        weight,
        reps,
        completed: true,
        ..ExerciseSet::new()
    }
}

fn raw_workout(id: &str, start: DateTime<Utc>, exercises: Vec<Exercise>) -> WorkoutSession {
    WorkoutSession {
        id: id.to_string(),
        name: format!("Workout {id}"),
        start_time: start,
        end_time: Some(start + Duration::minutes(45)),
        exercises,
    }
}

// Helper function to store a finished workout with one free-weight exercise
fn seed_workout(
    store: &Store,
    id: &str,
    start: DateTime<Utc>,
    exercise_name: &str,
    sets: Vec<ExerciseSet>,
) -> Result<WorkoutSession> {
    let mut exercise = Exercise::new(exercise_name, Some(ExerciseCategory::FreeWeight), false);
    exercise.sets = sets;
    let workout = raw_workout(id, start, vec![exercise]);
    store.save_workout(USER, &workout)?;
    Ok(workout)
}

// --- Session lifecycle ---

#[test]
fn test_blank_session_starts_idle() -> Result<()> {
    let store = create_test_store()?;
    let session = ActiveSession::mount(&store, USER, None, None, t0());

    assert_eq!(session.mode(), MountMode::Blank);
    assert!(session.name().starts_with("Workout "));
    assert!(session.exercises().is_empty());
    assert!(!session.timer().has_started());
    assert_eq!(session.elapsed_seconds(at(300)), 0); // clock waits for the first exercise
    assert!(!session.rest().is_active());
    Ok(())
}

#[test]
fn test_add_exercise_starts_the_clock() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());

    let id = session.add_exercise(
        "Bench Press",
        Some(ExerciseCategory::FreeWeight),
        false,
        at(10),
    );
    assert!(session.timer().has_started());
    assert!(session.timer().is_running());
    assert_eq!(session.elapsed_seconds(at(25)), 15);

    let exercise = session.exercise(&id)?;
    assert_eq!(exercise.name, "Bench Press");
    assert_eq!(exercise.sets.len(), 1); // one blank set to fill in
    assert!(session.is_expanded(&id));

    // A second exercise does not restart the clock
    session.add_exercise("Squat", None, false, at(50));
    assert_eq!(session.elapsed_seconds(at(60)), 50);
    Ok(())
}

#[test]
fn test_pause_and_resume_freeze_elapsed() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    session.add_exercise("Squat", None, false, t0());

    session.toggle_timer(at(60)); // pause
    assert!(!session.timer().is_running());
    assert_eq!(session.elapsed_seconds(at(90)), 60); // frozen while paused

    session.toggle_timer(at(100)); // resume
    assert!(session.timer().is_running());
    assert_eq!(session.elapsed_seconds(at(130)), 90); // the 40s pause is excluded
    Ok(())
}

#[test]
fn test_toggle_timer_starts_fresh_session() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());

    session.toggle_timer(at(5));
    assert!(session.timer().has_started());
    assert!(session.timer().is_running());
    assert_eq!(session.elapsed_seconds(at(8)), 3);
    Ok(())
}

// --- Sets ---

#[test]
fn test_update_set_applies_and_validates() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Bench Press", None, false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();

    session.update_set(&id, &set_id, SetChange::Weight(135.0), at(5))?;
    session.update_set(&id, &set_id, SetChange::Reps(5), at(6))?;
    assert_eq!(session.exercise(&id)?.sets[0].weight, 135.0);
    assert_eq!(session.exercise(&id)?.sets[0].reps, 5);

    assert!(session
        .update_set(&id, &set_id, SetChange::Weight(-10.0), at(7))
        .is_err());
    assert!(session
        .update_set(&id, &set_id, SetChange::Weight(f64::NAN), at(7))
        .is_err());
    assert!(session
        .update_set(&id, &set_id, SetChange::Reps(-1), at(7))
        .is_err());
    assert_eq!(session.exercise(&id)?.sets[0].weight, 135.0); // unchanged after rejects
    Ok(())
}

#[test]
fn test_complete_set_autofills_from_ghost() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Bench Press",
        vec![done_set(100.0, 8), done_set(100.0, 8)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise(
        "Bench Press",
        Some(ExerciseCategory::FreeWeight),
        false,
        t0(),
    );
    assert_eq!(session.ghost_sets(&id).map(|g| g.len()), Some(2));

    let set_id = session.exercise(&id)?.sets[0].id.clone();
    let completed = session.toggle_set_complete(&id, &set_id, at(30))?;
    assert!(completed);
    assert_eq!(session.exercise(&id)?.sets[0].weight, 100.0);
    assert_eq!(session.exercise(&id)?.sets[0].reps, 8);
    assert!(session.exercise(&id)?.sets[0].completed);
    assert!(session.rest().is_active());
    assert_eq!(session.rest().seconds_left(), DEFAULT_REST_SECS);
    Ok(())
}

#[test]
fn test_autofill_keeps_explicit_values() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Bench Press",
        vec![done_set(100.0, 8)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Bench Press", None, false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();

    session.update_set(&id, &set_id, SetChange::Weight(105.0), at(5))?;
    session.toggle_set_complete(&id, &set_id, at(10))?;
    assert_eq!(session.exercise(&id)?.sets[0].weight, 105.0); // explicit weight wins
    assert_eq!(session.exercise(&id)?.sets[0].reps, 8); // still-zero reps filled in
    Ok(())
}

#[test]
fn test_unilateral_autofill_fills_both_sides() -> Result<()> {
    let store = create_test_store()?;
    let mut rows = Exercise::new("Dumbbell Rows", Some(ExerciseCategory::FreeWeight), true);
    rows.sets = vec![ExerciseSet {
        weight: 40.0,
        reps_left: 8,
        reps_right: 8,
        completed: true,
        ..ExerciseSet::new()
    }];
    store.save_workout(
        USER,
        &raw_workout("w1", t0() - Duration::days(7), vec![rows]),
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise(
        "Dumbbell Rows",
        Some(ExerciseCategory::FreeWeight),
        true,
        t0(),
    );
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.toggle_set_complete(&id, &set_id, at(30))?;

    let filled = session.exercise(&id)?.sets[0].clone();
    assert_eq!(filled.weight, 40.0);
    assert_eq!(filled.reps_left, 8);
    assert_eq!(filled.reps_right, 8);
    assert_eq!(filled.reps, 0); // bilateral count untouched
    Ok(())
}

#[test]
fn test_cardio_autofill_uses_distance_and_time() -> Result<()> {
    let store = create_test_store()?;
    let mut run = Exercise::new("Running", Some(ExerciseCategory::Cardio), false);
    run.sets = vec![ExerciseSet {
        weight: 999.0, // stale junk that must not leak into a cardio set
        distance: 3.1,
        time: 30.0,
        completed: true,
        ..ExerciseSet::new()
    }];
    store.save_workout(
        USER,
        &raw_workout("w1", t0() - Duration::days(7), vec![run]),
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Running", Some(ExerciseCategory::Cardio), false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.toggle_set_complete(&id, &set_id, at(30))?;

    let filled = session.exercise(&id)?.sets[0].clone();
    assert_eq!(filled.distance, 3.1);
    assert_eq!(filled.time, 30.0);
    assert_eq!(filled.weight, 0.0);
    Ok(())
}

#[test]
fn test_uncomplete_keeps_values_and_countdown() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Bench Press",
        vec![done_set(100.0, 8)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Bench Press", None, false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.toggle_set_complete(&id, &set_id, at(30))?;

    let tick = session.tick(at(31));
    assert_eq!(tick.rest, RestTick::Counting(DEFAULT_REST_SECS - 1));

    let completed = session.toggle_set_complete(&id, &set_id, at(32))?;
    assert!(!completed);
    assert!(!session.exercise(&id)?.sets[0].completed);
    assert_eq!(session.exercise(&id)?.sets[0].weight, 100.0); // autofilled values stay
    assert!(session.rest().is_active()); // un-marking never stops the countdown
    assert_eq!(session.rest().seconds_left(), DEFAULT_REST_SECS - 1);
    Ok(())
}

#[test]
fn test_completing_another_set_restarts_countdown() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Squat", None, false, t0());
    session.add_set(&id, at(1))?;
    let first = session.exercise(&id)?.sets[0].id.clone();
    let second = session.exercise(&id)?.sets[1].id.clone();

    session.toggle_set_complete(&id, &first, at(30))?;
    for i in 0..10 {
        session.tick(at(31 + i));
    }
    assert_eq!(session.rest().seconds_left(), DEFAULT_REST_SECS - 10);

    session.toggle_set_complete(&id, &second, at(41))?;
    assert_eq!(session.rest().seconds_left(), DEFAULT_REST_SECS); // back to full
    Ok(())
}

#[test]
fn test_add_set_copies_previous_without_ghost() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Cable Flys", Some(ExerciseCategory::Cable), false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.update_set(&id, &set_id, SetChange::Weight(55.0), at(5))?;
    session.update_set(&id, &set_id, SetChange::Reps(12), at(6))?;

    session.add_set(&id, at(10))?;
    let sets = &session.exercise(&id)?.sets;
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[1].weight, 55.0);
    assert_eq!(sets[1].reps, 12);
    assert!(!sets[1].completed);
    assert_ne!(sets[1].id, sets[0].id);
    Ok(())
}

#[test]
fn test_add_set_blank_when_ghost_covers_index() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Bench Press",
        vec![done_set(100.0, 8), done_set(100.0, 8), done_set(95.0, 6)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Bench Press", None, false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.update_set(&id, &set_id, SetChange::Weight(135.0), at(5))?;
    session.update_set(&id, &set_id, SetChange::Reps(5), at(6))?;

    // Ghost data exists at index 1, so the new set starts blank instead of
    // carrying over 135x5
    session.add_set(&id, at(10))?;
    let sets = &session.exercise(&id)?.sets;
    assert_eq!(sets[1].weight, 0.0);
    assert_eq!(sets[1].reps, 0);
    Ok(())
}

#[test]
fn test_remove_last_set_keeps_at_least_one() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Squat", None, false, t0());

    session.remove_last_set(&id, at(5))?; // no-op at one set
    assert_eq!(session.exercise(&id)?.sets.len(), 1);

    session.add_set(&id, at(6))?;
    assert_eq!(session.exercise(&id)?.sets.len(), 2);
    session.remove_last_set(&id, at(7))?;
    assert_eq!(session.exercise(&id)?.sets.len(), 1);
    session.remove_last_set(&id, at(8))?;
    assert_eq!(session.exercise(&id)?.sets.len(), 1);
    Ok(())
}

#[test]
fn test_remove_exercise_clears_session_state() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Bench Press",
        vec![done_set(100.0, 8)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Bench Press", None, false, t0());
    assert!(session.ghost_sets(&id).is_some());
    assert!(session.stats(&id).is_some());

    session.remove_exercise(&id, at(10))?;
    assert!(session.exercises().is_empty());
    assert!(session.ghost_sets(&id).is_none());
    assert!(session.stats(&id).is_none());
    assert!(session.exercise(&id).is_err());
    Ok(())
}

#[test]
fn test_notes_set_and_clear() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Squat", None, false, t0());

    session.set_exercise_notes(&id, "felt heavy, slow on rep 4", at(5))?;
    assert_eq!(
        session.exercise(&id)?.notes.as_deref(),
        Some("felt heavy, slow on rep 4")
    );
    assert!(session.notes_open(&id));

    session.set_exercise_notes(&id, "   ", at(6))?; // blank clears
    assert!(session.exercise(&id)?.notes.is_none());
    assert!(!session.notes_open(&id));
    Ok(())
}

#[test]
fn test_rename_refreshes_ghost_data() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Bench Press",
        vec![done_set(100.0, 8)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Banch Press", None, false, t0()); // typo, no history
    assert!(session.ghost_sets(&id).is_none());

    session.rename_exercise(&id, "Bench Press", at(5))?;
    assert!(session.ghost_sets(&id).is_some());
    assert!(session.stats(&id).is_some());

    assert!(session.rename_exercise(&id, "   ", at(6)).is_err());
    assert_eq!(session.exercise(&id)?.name, "Bench Press");
    Ok(())
}

// --- Rest timer ---

#[test]
fn test_rest_adjust_persists_and_shifts_countdown() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Squat", None, false, t0());
    session.add_set(&id, at(1))?;
    let first = session.exercise(&id)?.sets[0].id.clone();
    let second = session.exercise(&id)?.sets[1].id.clone();
    session.toggle_set_complete(&id, &first, at(30))?;

    assert_eq!(session.adjust_rest(30, at(31))?, 120);
    assert_eq!(session.rest().seconds_left(), 120); // running countdown shifted too
    assert_eq!(store.rest_timer_preference(USER), 120); // persisted as preference

    assert_eq!(session.adjust_rest(-30, at(32))?, 90);
    session.skip_rest(at(33));
    assert!(!session.rest().is_active());
    assert_eq!(session.rest().seconds_left(), 0);

    // The next completion starts from the adjusted default
    session.toggle_set_complete(&id, &second, at(40))?;
    assert_eq!(session.rest().seconds_left(), 90);
    Ok(())
}

#[test]
fn test_rest_adjust_clamps_at_zero() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    assert_eq!(session.adjust_rest(-500, at(1))?, 0);
    assert_eq!(store.rest_timer_preference(USER), 0);
    Ok(())
}

#[test]
fn test_rest_counts_down_to_finished_then_idle() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Squat", None, false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.toggle_set_complete(&id, &set_id, at(30))?;

    let mut last = RestTick::Idle;
    for i in 0..DEFAULT_REST_SECS {
        last = session.tick(at(31 + i)).rest;
    }
    assert_eq!(last, RestTick::Finished);
    assert!(!session.rest().is_active());
    assert_eq!(session.tick(at(200)).rest, RestTick::Idle);
    Ok(())
}

#[test]
fn test_session_uses_stored_rest_preference() -> Result<()> {
    let store = create_test_store()?;
    store.save_rest_timer_preference(USER, 120)?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    assert_eq!(session.rest().duration(), 120);
    let id = session.add_exercise("Squat", None, false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.toggle_set_complete(&id, &set_id, at(30))?;
    assert_eq!(session.rest().seconds_left(), 120);
    Ok(())
}

// --- Draft autosave and recovery ---

#[test]
fn test_autosave_debounces_writes() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    assert!(store.draft(USER).is_none());

    assert!(!session.tick(at_ms(500)).autosaved); // quiet period not over
    assert!(store.draft(USER).is_none());
    assert!(session.tick(at_ms(1000)).autosaved);
    let first = store.draft(USER).expect("draft written");

    session.set_name("Leg Day", at_ms(5000));
    session.set_name("Leg Day II", at_ms(5800)); // pushes the deadline out
    assert!(!session.tick(at_ms(6000)).autosaved);
    assert_eq!(
        store.draft(USER).expect("draft").workout_name,
        first.workout_name
    );
    assert!(session.tick(at_ms(6800)).autosaved);
    assert_eq!(store.draft(USER).expect("draft").workout_name, "Leg Day II");
    Ok(())
}

#[test]
fn test_flush_writes_immediately_and_cancels_pending() -> Result<()> {
    let store = create_test_store()?;
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    session.set_name("Right Now", at_ms(100));
    session.flush(at_ms(150))?;
    assert_eq!(store.draft(USER).expect("draft").workout_name, "Right Now");

    // The pending debounce was cancelled along the way
    assert!(!session.tick(at_ms(5000)).autosaved);
    Ok(())
}

#[test]
fn test_draft_restores_matching_session() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;

    let mut first = ActiveSession::mount(&store, USER, None, None, t0());
    first.add_exercise("Squat", None, false, t0());
    first.set_name("Leg Day", at(1));
    first.flush(at(1))?;

    // A plain remount restores the draft
    let restored = ActiveSession::mount(&store, USER, None, None, at(60));
    assert_eq!(restored.mode(), MountMode::Draft);
    assert_eq!(restored.name(), "Leg Day");
    assert_eq!(restored.exercises().len(), 1);

    // An edit mount does not consume the unrelated draft
    let editing = ActiveSession::mount(&store, USER, Some("w1"), None, at(60));
    assert_eq!(editing.mode(), MountMode::Edit);
    assert_eq!(editing.name(), "Workout w1");
    assert_eq!(
        store.draft(USER).expect("draft untouched").workout_name,
        "Leg Day"
    );

    // And a draft targeting w1 is ignored by a plain mount
    let mut edit_session = ActiveSession::mount(&store, USER, Some("w1"), None, at(120));
    edit_session.set_name("Edited", at(120));
    edit_session.flush(at(120))?;
    let plain = ActiveSession::mount(&store, USER, None, None, at(180));
    assert_eq!(plain.mode(), MountMode::Blank);
    Ok(())
}

#[test]
fn test_draft_restores_timer_and_rest_countdown() -> Result<()> {
    let store = create_test_store()?;
    let mut first = ActiveSession::mount(&store, USER, None, None, t0());
    let id = first.add_exercise("Bench Press", None, false, t0());
    let set_id = first.exercise(&id)?.sets[0].id.clone();
    first.toggle_set_complete(&id, &set_id, t0())?; // countdown starts at 90
    first.flush(t0())?; // persists end time t0 + 90s

    let restored = ActiveSession::mount(&store, USER, None, None, at(85));
    assert_eq!(restored.mode(), MountMode::Draft);
    assert!(restored.timer().is_running());
    assert_eq!(restored.elapsed_seconds(at(85)), 85);
    assert!(restored.rest().is_active());
    assert_eq!(restored.rest().seconds_left(), 5); // recomputed from the end time

    // Past the end time the countdown comes back silent
    let late = ActiveSession::mount(&store, USER, None, None, at(95));
    assert!(!late.rest().is_active());
    assert_eq!(late.rest().seconds_left(), 0);
    Ok(())
}

#[test]
fn test_restored_countdown_takes_duration_from_preference() -> Result<()> {
    let store = create_test_store()?;
    let mut first = ActiveSession::mount(&store, USER, None, None, t0());
    let id = first.add_exercise("Bench Press", None, false, t0());
    let set_id = first.exercise(&id)?.sets[0].id.clone();
    first.toggle_set_complete(&id, &set_id, t0())?;
    first.flush(t0())?; // snapshot carries duration 90

    store.save_rest_timer_preference(USER, 60)?;
    let restored = ActiveSession::mount(&store, USER, None, None, at(30));
    assert!(restored.rest().is_active());
    assert_eq!(restored.rest().duration(), 60); // preference wins over the snapshot
    assert_eq!(restored.rest().seconds_left(), 60);
    Ok(())
}

#[test]
fn test_paused_clock_survives_restart() -> Result<()> {
    let store = create_test_store()?;
    let mut first = ActiveSession::mount(&store, USER, None, None, t0());
    first.add_exercise("Squat", None, false, t0());
    first.toggle_timer(at(60)); // pause at 1:00
    first.flush(at(61))?;

    let restored = ActiveSession::mount(&store, USER, None, None, at(300));
    assert!(!restored.timer().is_running());
    assert_eq!(restored.elapsed_seconds(at(400)), 60); // still frozen
    Ok(())
}

#[test]
fn test_draft_parses_browser_wire_format() -> Result<()> {
    let raw = r#"{
        "workoutName": "Morning Session",
        "startTime": "2025-03-10T17:00:00Z",
        "hasStarted": true,
        "exercises": [],
        "timerPaused": false,
        "totalPausedTime": 4000,
        "restTimer": { "isActive": true, "timeLeft": 42, "duration": 90, "endTime": "2025-03-10T17:30:00Z" }
    }"#;
    let draft: WorkoutDraft = serde_json::from_str(raw)?;
    assert_eq!(draft.workout_name, "Morning Session");
    assert_eq!(draft.total_paused_ms, 4000);
    assert!(draft.edit_workout_id.is_none());
    let rest = draft.rest_timer.expect("rest snapshot");
    assert!(rest.is_active);
    assert_eq!(rest.time_left, 42);

    // A draft predating the started flag is treated as started
    let legacy: WorkoutDraft =
        serde_json::from_str(r#"{"workoutName":"X","startTime":"2025-03-10T17:00:00Z"}"#)?;
    assert!(legacy.has_started);
    Ok(())
}

// --- Finish, cancel, edit ---

#[test]
fn test_finish_saves_workout_and_clears_state() -> Result<()> {
    let store = create_test_store()?;
    store.save_chat_history(
        USER,
        &[ChatMessage {
            id: new_id(),
            role: ChatRole::User,
            text: "how was volume this week?".to_string(),
            timestamp: t0(),
        }],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Squat", None, false, t0());
    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.toggle_set_complete(&id, &set_id, at(30))?;
    session.flush(at(30))?;
    assert!(store.draft(USER).is_some());

    let workout = session.finish(at(1800))?;
    assert_eq!(workout.start_time, t0());
    assert_eq!(workout.end_time, Some(at(1800)));
    assert_eq!(workout.exercises.len(), 1);

    let stored = store.workouts(USER);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, workout.id);
    assert!(store.draft(USER).is_none());
    assert!(store.chat_history(USER).is_empty());
    Ok(())
}

#[test]
fn test_finish_edit_overwrites_in_place() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w2",
        t0() - Duration::days(14),
        "Squat",
        vec![done_set(180.0, 5)],
    )?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, Some("w1"), None, t0());
    session.set_name("Renamed", t0());
    let workout = session.finish(at(60))?;
    assert_eq!(workout.id, "w1");

    let stored = store.workouts(USER);
    assert_eq!(stored.len(), 2); // no duplicate
    let updated = store.workout_by_id(USER, "w1").expect("workout kept");
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.start_time, t0() - Duration::days(7)); // original clock kept
    assert_eq!(updated.end_time, Some(at(60)));
    Ok(())
}

#[test]
fn test_cancel_discards_draft_only() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;

    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    session.add_exercise("Bench Press", None, false, t0());
    session.flush(at(1))?;
    assert!(store.draft(USER).is_some());

    session.cancel()?;
    assert!(store.draft(USER).is_none());
    assert_eq!(store.workouts(USER).len(), 1); // history untouched
    Ok(())
}

#[test]
fn test_edit_mount_opens_paused_with_everything_expanded() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::hours(2),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;

    let session = ActiveSession::mount(&store, USER, Some("w1"), None, t0());
    assert_eq!(session.mode(), MountMode::Edit);
    assert!(session.timer().has_started());
    assert!(!session.timer().is_running());
    assert_eq!(session.elapsed_seconds(t0()), 7200); // wall time since original start
    let first = &session.exercises()[0];
    assert!(session.is_expanded(&first.id));
    Ok(())
}

#[test]
fn test_edit_mount_missing_workout_falls_back_to_blank() -> Result<()> {
    let store = create_test_store()?;
    let session = ActiveSession::mount(&store, USER, Some("missing"), None, t0());
    assert_eq!(session.mode(), MountMode::Blank);
    assert!(session.exercises().is_empty());
    Ok(())
}

#[test]
fn test_edit_session_ghosts_skip_the_edited_workout() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w2",
        t0() - Duration::days(14),
        "Squat",
        vec![done_set(180.0, 5)],
    )?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;

    let workouts = store.workouts(USER);
    assert_eq!(
        history::last_sets_for(&workouts, "Squat", None).expect("ghosts")[0].weight,
        200.0
    );
    assert_eq!(
        history::last_sets_for(&workouts, "Squat", Some("w1")).expect("ghosts")[0].weight,
        180.0
    );

    let session = ActiveSession::mount(&store, USER, Some("w1"), None, t0());
    let id = session.exercises()[0].id.clone();
    assert_eq!(session.ghost_sets(&id).expect("ghosts")[0].weight, 180.0);
    Ok(())
}

// --- Templates and presets ---

#[test]
fn test_template_mount_expands_blank_sets() -> Result<()> {
    let store = create_test_store()?;
    let template = WorkoutTemplate {
        name: Some("Push Day".to_string()),
        exercises: vec![
            TemplateExercise {
                name: "Bench Press".to_string(),
                category: Some(ExerciseCategory::FreeWeight),
                is_unilateral: false,
                notes: None,
                sets: 3,
            },
            TemplateExercise {
                name: "Lateral Raises".to_string(),
                category: Some(ExerciseCategory::FreeWeight),
                is_unilateral: false,
                notes: Some("light, slow negatives".to_string()),
                sets: 2,
            },
        ],
    };

    let session = ActiveSession::mount(&store, USER, None, Some(template), t0());
    assert_eq!(session.mode(), MountMode::Template);
    assert_eq!(session.name(), "Push Day");
    assert_eq!(session.exercises().len(), 2);

    let bench = &session.exercises()[0];
    assert_eq!(bench.sets.len(), 3);
    assert!(bench
        .sets
        .iter()
        .all(|s| s.weight == 0.0 && s.reps == 0 && !s.completed));
    assert!(session.is_expanded(&bench.id));
    assert!(session.timer().is_running()); // template mount starts the clock

    let raises = &session.exercises()[1];
    assert_eq!(raises.sets.len(), 2);
    assert!(session.notes_open(&raises.id)); // notes arrive open
    Ok(())
}

#[test]
fn test_template_parses_from_json() -> Result<()> {
    let raw = r#"{
        "name": "Pull Day",
        "exercises": [
            { "name": "Lat Pulldown", "category": "Cable", "sets": 4 },
            { "name": "Dumbbell Rows", "isUnilateral": true }
        ]
    }"#;
    let template: WorkoutTemplate = serde_json::from_str(raw)?;
    assert_eq!(template.name.as_deref(), Some("Pull Day"));
    assert_eq!(template.exercises[0].category, Some(ExerciseCategory::Cable));
    assert_eq!(template.exercises[0].sets, 4);
    assert!(template.exercises[1].is_unilateral);
    assert_eq!(template.exercises[1].sets, 3); // default set count
    Ok(())
}

#[test]
fn test_preset_catalog_lookup_and_seeding() -> Result<()> {
    let preset = presets::find("full body power").expect("case-insensitive find");
    assert_eq!(preset.name, "Full Body Power");
    assert!(presets::find("No Such Plan").is_none());

    for suggestion in presets::suggested_for(Goal::Strength) {
        assert!(suggestion.goal == Goal::Strength || suggestion.goal == Goal::Overall);
    }
    assert!(!presets::suggested_for(Goal::Endurance).is_empty());
    for suggestion in presets::suggested_for(Goal::Overall) {
        assert_eq!(suggestion.goal, Goal::Overall);
    }

    let template = preset.to_template();
    assert_eq!(template.name.as_deref(), Some("Full Body Power"));
    assert_eq!(template.exercises.len(), 4);
    assert_eq!(template.exercises[0].sets, 5);

    let store = create_test_store()?;
    let session = ActiveSession::mount(&store, USER, None, Some(template), t0());
    assert_eq!(session.mode(), MountMode::Template);
    assert_eq!(session.exercises()[0].name, "Barbell Squat");
    assert_eq!(session.exercises()[0].sets.len(), 5);
    Ok(())
}

// --- History and stats ---

#[test]
fn test_stats_last_and_pr_formats() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "old",
        t0() - Duration::days(14),
        "Bench Press",
        vec![done_set(100.0, 5), done_set(120.0, 3), done_set(120.0, 5)],
    )?;
    seed_workout(
        &store,
        "new",
        t0() - Duration::days(7),
        "Bench Press",
        vec![
            done_set(100.0, 8),
            // never completed, must not count toward the record
            ExerciseSet {
                weight: 500.0,
                reps: 1,
                ..ExerciseSet::new()
            },
        ],
    )?;

    let stats = history::stats_for(&store.workouts(USER), "bench press").expect("stats");
    assert_eq!(stats.last, "100lbs x 8"); // best of the most recent session
    assert_eq!(stats.pr, "120lbs x 5"); // weight tie broken by reps
    Ok(())
}

#[test]
fn test_stats_na_without_completed_sets() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Bench Press",
        vec![ExerciseSet {
            weight: 100.0,
            reps: 5,
            ..ExerciseSet::new()
        }],
    )?;

    let stats = history::stats_for(&store.workouts(USER), "Bench Press").expect("stats");
    assert_eq!(stats.last, "N/A");
    assert_eq!(stats.pr, "N/A");
    assert!(history::stats_for(&store.workouts(USER), "Deadlift").is_none());
    Ok(())
}

#[test]
fn test_cardio_stats_format() -> Result<()> {
    let store = create_test_store()?;
    let mut run = Exercise::new("Running", Some(ExerciseCategory::Cardio), false);
    run.sets = vec![ExerciseSet {
        distance: 3.1,
        time: 30.0,
        completed: true,
        ..ExerciseSet::new()
    }];
    store.save_workout(
        USER,
        &raw_workout("w1", t0() - Duration::days(7), vec![run]),
    )?;

    let stats = history::stats_for(&store.workouts(USER), "Running").expect("stats");
    assert_eq!(stats.last, "3.1mi / 30m");
    assert_eq!(stats.pr, "3.1mi / 30m");
    Ok(())
}

#[test]
fn test_unilateral_stats_and_volume() -> Result<()> {
    let store = create_test_store()?;
    let mut rows = Exercise::new("Dumbbell Rows", Some(ExerciseCategory::FreeWeight), true);
    rows.sets = vec![ExerciseSet {
        weight: 100.0,
        reps_left: 3,
        reps_right: 5,
        completed: true,
        ..ExerciseSet::new()
    }];
    store.save_workout(
        USER,
        &raw_workout("w1", t0() - Duration::days(7), vec![rows]),
    )?;

    let workouts = store.workouts(USER);
    let stats = history::stats_for(&workouts, "Dumbbell Rows").expect("stats");
    assert_eq!(stats.last, "100lbs x 3"); // left side stands in for reps

    let points = history::exercise_history(&workouts, "Dumbbell Rows");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].volume, 800.0); // 100 * (3 + 5)
    Ok(())
}

#[test]
fn test_exercise_history_points_oldest_first() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "old",
        t0() - Duration::days(14),
        "Squat",
        vec![done_set(100.0, 5), done_set(100.0, 5)],
    )?;
    seed_workout(
        &store,
        "new",
        t0() - Duration::days(7),
        "Squat",
        vec![
            done_set(110.0, 5),
            ExerciseSet {
                weight: 120.0,
                reps: 1,
                ..ExerciseSet::new()
            },
        ],
    )?;

    let points = history::exercise_history(&store.workouts(USER), "Squat");
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, t0() - Duration::days(14)); // oldest first
    assert_eq!(points[0].max_value, 100.0);
    assert_eq!(points[0].volume, 1000.0);
    assert_eq!(points[1].max_value, 110.0); // the incomplete 120 does not count
    assert_eq!(points[1].volume, 550.0);
    assert_eq!(points[1].best_set.reps, 5);
    Ok(())
}

#[test]
fn test_history_skips_workouts_with_nothing_completed() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Squat",
        vec![ExerciseSet {
            weight: 100.0,
            reps: 5,
            ..ExerciseSet::new()
        }],
    )?;
    assert!(history::exercise_history(&store.workouts(USER), "Squat").is_empty());
    Ok(())
}

#[test]
fn test_known_exercises_dedupe_and_sort() -> Result<()> {
    let mut bench = Exercise::new("Bench Press", Some(ExerciseCategory::FreeWeight), false);
    bench.sets = vec![done_set(100.0, 8)];
    let mut bench_lower = Exercise::new("bench press", None, false);
    bench_lower.sets = vec![done_set(95.0, 8)];
    let mut squat = Exercise::new("Squat", None, false);
    squat.sets = vec![done_set(200.0, 5)];

    let workouts = vec![
        raw_workout("new", t0() - Duration::days(7), vec![bench]),
        raw_workout("old", t0() - Duration::days(14), vec![bench_lower, squat]),
    ];

    let known = history::known_exercises(&workouts, &[]);
    assert_eq!(known.len(), 2);
    assert_eq!(known[0].name, "Bench Press"); // first occurrence wins the casing
    assert_eq!(known[0].category, Some(ExerciseCategory::FreeWeight));
    assert_eq!(known[1].name, "Squat");

    let filtered = history::known_exercises(&workouts, &["SQUAT".to_string()]);
    assert_eq!(filtered.len(), 1); // hidden names match case-insensitively
    assert_eq!(filtered[0].name, "Bench Press");
    Ok(())
}

#[test]
fn test_recent_workouts_context_format() -> Result<()> {
    let mut squat = Exercise::new("Squat", Some(ExerciseCategory::FreeWeight), false);
    squat.sets = vec![done_set(225.0, 5)];
    let mut run = Exercise::new("Running", Some(ExerciseCategory::Cardio), false);
    run.sets = vec![ExerciseSet {
        distance: 3.1,
        time: 30.0,
        completed: true,
        ..ExerciseSet::new()
    }];
    let mut rows = Exercise::new("Dumbbell Rows", None, true);
    rows.sets = vec![ExerciseSet {
        weight: 40.0,
        reps_left: 8,
        reps_right: 8,
        completed: true,
        ..ExerciseSet::new()
    }];
    let plank = Exercise::new("Plank", Some(ExerciseCategory::Bodyweight), false);

    let workouts = vec![raw_workout("w1", t0(), vec![squat, run, rows, plank])];
    let context = history::recent_workouts_context(&workouts);
    let expected = concat!(
        "RECENT WORKOUT HISTORY:\n",
        "\nWorkout: Workout w1 (3/10/2025)\n",
        "  - Squat (Free Weight): 225lbs x 5\n",
        "  - Running (Cardio): 3.1mi/30m\n",
        "  - Dumbbell Rows (Free Weight): 40lbs x (L:8 R:8)\n",
        "  - Plank (Bodyweight): No sets completed.\n",
    );
    assert_eq!(context, expected);

    assert_eq!(
        history::recent_workouts_context(&[]),
        "No previous workout history."
    );

    // Only the five most recent workouts make the summary
    let many: Vec<WorkoutSession> = (0..6)
        .map(|i| raw_workout(&format!("w{i}"), at(i64::from(i) * 60), Vec::new()))
        .collect();
    let context = history::recent_workouts_context(&many);
    assert_eq!(context.matches("Workout: ").count(), 5);
    Ok(())
}

// --- Store ---

#[test]
fn test_store_prepends_and_upserts_workouts() -> Result<()> {
    let store = create_test_store()?;
    let first = seed_workout(
        &store,
        "a",
        t0() - Duration::days(14),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;
    seed_workout(
        &store,
        "b",
        t0() - Duration::days(7),
        "Bench Press",
        vec![done_set(100.0, 8)],
    )?;

    let list = store.workouts(USER);
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].id, "b"); // newest first
    assert_eq!(list[1].id, "a");

    let mut renamed = first.clone();
    renamed.name = "Heavy Squats".to_string();
    store.save_workout(USER, &renamed)?;
    let list = store.workouts(USER);
    assert_eq!(list.len(), 2); // overwritten in place, not duplicated
    assert_eq!(list[1].name, "Heavy Squats");

    store.delete_workout(USER, "a")?;
    assert_eq!(store.workouts(USER).len(), 1);
    assert!(store.workout_by_id(USER, "a").is_none());
    Ok(())
}

#[test]
fn test_store_scopes_data_by_user() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(7),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;
    store.save_rest_timer_preference(USER, 120)?;

    assert!(store.workouts("other").is_empty());
    assert_eq!(store.rest_timer_preference("other"), DEFAULT_REST_SECS);
    Ok(())
}

#[test]
fn test_hidden_exercises_and_auto_unhide() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "w1",
        t0() - Duration::days(14),
        "Bench Press",
        vec![done_set(100.0, 8)],
    )?;
    seed_workout(
        &store,
        "w2",
        t0() - Duration::days(7),
        "Squat",
        vec![done_set(200.0, 5)],
    )?;

    store.hide_exercise(USER, "Bench Press")?;
    store.hide_exercise(USER, "Bench Press")?; // no duplicate entry
    assert_eq!(store.hidden_exercises(USER).len(), 1);

    let known = history::known_exercises(&store.workouts(USER), &store.hidden_exercises(USER));
    assert_eq!(known.len(), 1);
    assert_eq!(known[0].name, "Squat");

    store.unhide_exercise(USER, "Bench Press")?;
    let known = history::known_exercises(&store.workouts(USER), &store.hidden_exercises(USER));
    assert_eq!(known.len(), 2);

    // Logging a hidden exercise again brings it back automatically
    store.hide_exercise(USER, "Squat")?;
    seed_workout(&store, "w3", t0(), "squat", vec![done_set(205.0, 5)])?;
    assert!(store.hidden_exercises(USER).is_empty());
    Ok(())
}

#[test]
fn test_chat_history_roundtrip() -> Result<()> {
    let store = create_test_store()?;
    let messages = vec![
        ChatMessage {
            id: new_id(),
            role: ChatRole::User,
            text: "How was my squat volume this month?".to_string(),
            timestamp: t0(),
        },
        ChatMessage {
            id: new_id(),
            role: ChatRole::Model,
            text: "Trending up around 8 percent.".to_string(),
            timestamp: at(5),
        },
    ];
    store.save_chat_history(USER, &messages)?;
    let stored = store.chat_history(USER);
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].role, ChatRole::Model);

    store.clear_chat_history(USER)?;
    assert!(store.chat_history(USER).is_empty());
    Ok(())
}

// --- Small pieces ---

#[test]
fn test_format_elapsed() {
    assert_eq!(format_elapsed(0), "0:00");
    assert_eq!(format_elapsed(59), "0:59");
    assert_eq!(format_elapsed(61), "1:01");
    assert_eq!(format_elapsed(600), "10:00");
    assert_eq!(format_elapsed(3661), "61:01"); // minutes keep counting past an hour
}

#[test]
fn test_parse_helpers() {
    assert_eq!(parse_category("free weight"), Some(ExerciseCategory::FreeWeight));
    assert_eq!(parse_category("free-weight"), Some(ExerciseCategory::FreeWeight));
    assert_eq!(parse_category("Cardio"), Some(ExerciseCategory::Cardio));
    assert_eq!(parse_category("kettlebell"), None);

    assert_eq!(parse_goal("strength"), Some(Goal::Strength));
    assert_eq!(parse_goal(" Overall "), Some(Goal::Overall));
    assert_eq!(parse_goal("cardio"), None);
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.user, "default");
    assert_eq!(config.goal, "Overall");
    assert!(config.bell_on_rest_complete);
}

// --- End to end ---

#[test]
fn test_full_session_with_restart() -> Result<()> {
    let store = create_test_store()?;
    seed_workout(
        &store,
        "prior",
        t0() - Duration::days(8),
        "Squat",
        vec![done_set(225.0, 5), done_set(225.0, 5), done_set(225.0, 5)],
    )?;

    // Start fresh and log the first set; ghosts and stats come along
    let mut session = ActiveSession::mount(&store, USER, None, None, t0());
    let id = session.add_exercise("Squat", Some(ExerciseCategory::FreeWeight), false, t0());
    let stats = session.stats(&id).expect("stats").clone();
    assert_eq!(stats.last, "225lbs x 5");
    assert_eq!(stats.pr, "225lbs x 5");

    let set_id = session.exercise(&id)?.sets[0].id.clone();
    session.toggle_set_complete(&id, &set_id, at(30))?;
    assert_eq!(session.exercise(&id)?.sets[0].weight, 225.0); // ghost autofill
    session.flush(at(30))?;

    // Simulate an app restart one minute in
    let mut session = ActiveSession::mount(&store, USER, None, None, at(60));
    assert_eq!(session.mode(), MountMode::Draft);
    assert_eq!(session.elapsed_seconds(at(60)), 60);
    assert_eq!(session.rest().seconds_left(), 60); // 90s countdown, 30s spent
    let id = session.exercises()[0].id.clone();
    assert!(session.exercise(&id)?.sets[0].completed);

    // Second set: ghost data at index 1 keeps it blank, then log 230x3
    session.add_set(&id, at(120))?;
    let second = session.exercise(&id)?.sets[1].id.clone();
    assert_eq!(session.exercise(&id)?.sets[1].weight, 0.0);
    session.update_set(&id, &second, SetChange::Weight(230.0), at(130))?;
    session.update_set(&id, &second, SetChange::Reps(3), at(131))?;
    session.toggle_set_complete(&id, &second, at(140))?;
    assert_eq!(session.exercise(&id)?.sets[1].weight, 230.0); // explicit values kept

    // Finish and make sure everything landed
    let workout = session.finish(at(300))?;
    assert_eq!(workout.exercises[0].sets.len(), 2);
    assert!(workout.exercises[0].sets.iter().all(|s| s.completed));
    assert_eq!(workout.end_time, Some(at(300)));
    assert_eq!(workout.start_time, t0());

    let stored = store.workouts(USER);
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].id, workout.id); // newest first
    assert!(store.draft(USER).is_none());
    Ok(())
}

//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use std::io::{stdin, stdout, Write};
use std::thread;
use std::time::Duration as StdDuration;

use ironlog_lib::{
    format_elapsed, get_config_path, get_db_path, history, load_config, parse_category,
    parse_goal, presets, ActiveSession, ChatRole, Exercise, ExerciseSet, Goal, HistoryPoint,
    KnownExercise, MountMode, PresetWorkout, RestTick, SetChange, Store, WorkoutSession,
    WorkoutTemplate,
};

fn main() -> Result<()> {
    init_logging();

    // --- Check for completion generation request FIRST ---
    let cli_args = cli::parse_args(); // Parse arguments once

    if let cli::Commands::GenerateCompletion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command(); // Get the command structure
        let bin_name = cmd.get_name().to_string();

        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let config_path =
        get_config_path().context("Failed to determine configuration file path")?;
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {config_path:?}"))?;
    let user = cli_args.user.unwrap_or_else(|| config.user.clone());

    let db_path = get_db_path().context("Failed to determine database path")?;
    let store =
        Store::open(&db_path).with_context(|| format!("Failed to open database at {db_path:?}"))?;

    // --- Execute Commands ---
    match cli_args.command {
        cli::Commands::GenerateCompletion { .. } => {
            // This case is handled above, but keep it exhaustive
            unreachable!("Completion generation should have exited already");
        }

        // --- Session Lifecycle Commands ---
        cli::Commands::Start {
            name,
            edit,
            preset,
            template,
        } => {
            let seed: Option<WorkoutTemplate> = if let Some(preset_name) = preset {
                let preset = presets::find(&preset_name).ok_or_else(|| {
                    anyhow!("Preset '{preset_name}' not found. Use 'presets' to list the catalog.")
                })?;
                Some(preset.to_template())
            } else if let Some(path) = template {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read template file {path:?}"))?;
                let parsed: WorkoutTemplate = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse template file {path:?}"))?;
                Some(parsed)
            } else {
                None
            };
            let edit_id = match edit {
                Some(prefix) => Some(resolve_workout_id(&store, &user, &prefix)?),
                None => None,
            };

            let now = Utc::now();
            let mut session = ActiveSession::mount(&store, &user, edit_id.as_deref(), seed, now);
            if let Some(name) = name {
                session.set_name(&name, now);
            }
            session.flush(now)?;
            match session.mode() {
                MountMode::Draft => {
                    println!("Resumed workout '{}' already in progress.", session.name());
                }
                MountMode::Edit => println!("Editing workout '{}'.", session.name()),
                MountMode::Template => {
                    println!("Started workout '{}' from template.", session.name());
                }
                MountMode::Blank => println!("Started workout '{}'.", session.name()),
            }
            print_session(&session, now);
        }
        cli::Commands::Status => {
            let now = Utc::now();
            let session = mount_current(&store, &user, now)?;
            print_session(&session, now);
        }
        cli::Commands::Watch => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            print_session(&session, now);
            println!("\nWatching (Ctrl+C to stop)...");
            loop {
                thread::sleep(StdDuration::from_secs(1));
                let now = Utc::now();
                let tick = session.tick(now);
                if tick.rest == RestTick::Finished {
                    if config.bell_on_rest_complete {
                        print!("\x07");
                    }
                    println!("\nRest complete.");
                }
                let rest_part = if session.rest().is_active() {
                    format!("  rest {}", format_elapsed(session.rest().seconds_left()))
                } else {
                    String::new()
                };
                let state = if session.timer().is_running() {
                    ""
                } else {
                    "  (paused)"
                };
                print!(
                    "\r  {}{}{}   ",
                    format_elapsed(session.elapsed_seconds(now)),
                    rest_part,
                    state
                );
                let _ = stdout().flush();
            }
        }
        cli::Commands::Name { name } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            session.set_name(&name, now);
            session.flush(now)?;
            println!("Workout renamed to '{}'.", session.name());
        }
        cli::Commands::Pause => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            session.toggle_timer(now);
            session.flush(now)?;
            if session.timer().is_running() {
                println!(
                    "Workout clock running ({} elapsed).",
                    format_elapsed(session.elapsed_seconds(now))
                );
            } else {
                println!(
                    "Workout clock paused at {}.",
                    format_elapsed(session.elapsed_seconds(now))
                );
            }
        }
        cli::Commands::Finish => {
            let now = Utc::now();
            let session = mount_current(&store, &user, now)?;
            let workout = session.finish(now)?;
            let completed = workout
                .exercises
                .iter()
                .flat_map(|e| &e.sets)
                .filter(|s| s.completed)
                .count();
            println!(
                "Saved workout '{}' ({} exercise(s), {} completed set(s)).",
                workout.name,
                workout.exercises.len(),
                completed
            );
        }
        cli::Commands::Cancel { yes } => {
            let now = Utc::now();
            let session = mount_current(&store, &user, now)?;
            if !yes
                && !confirm(&format!(
                    "Discard workout '{}'? All progress will be lost.",
                    session.name()
                ))?
            {
                println!("Kept the workout in progress.");
                return Ok(());
            }
            session.cancel()?;
            println!("Workout discarded.");
        }

        // --- Exercise Commands ---
        cli::Commands::AddExercise {
            name,
            category,
            unilateral,
        } => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                bail!("Exercise name cannot be empty.");
            }
            let category = match category {
                Some(raw) => Some(parse_category(&raw).ok_or_else(|| {
                    anyhow!(
                        "Unknown category '{raw}'. Valid: free weight, cable, machine, bodyweight, cardio, other"
                    )
                })?),
                None => None,
            };
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = session.add_exercise(trimmed, category, unilateral, now);
            session.flush(now)?;
            println!("Added '{}' to the workout.", session.exercise(&id)?.name);
            if let Some(stats) = session.stats(&id) {
                println!("  Last: {}  PR: {}", stats.last, stats.pr);
            }
        }
        cli::Commands::RenameExercise { exercise, name } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            let old = session.exercise(&id)?.name.clone();
            session.rename_exercise(&id, &name, now)?;
            session.flush(now)?;
            println!("Renamed '{}' to '{}'.", old, session.exercise(&id)?.name);
        }
        cli::Commands::Note { exercise, text } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            let joined = text.join(" ");
            session.set_exercise_notes(&id, &joined, now)?;
            session.flush(now)?;
            if joined.trim().is_empty() {
                println!("Cleared notes for '{}'.", session.exercise(&id)?.name);
            } else {
                println!("Noted for '{}': {}", session.exercise(&id)?.name, joined);
            }
        }
        cli::Commands::RemoveExercise { exercise } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            let name = session.exercise(&id)?.name.clone();
            session.remove_exercise(&id, now)?;
            session.flush(now)?;
            println!("Removed '{name}' from the workout.");
        }
        cli::Commands::Expand { exercise } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            session.toggle_exercise_expanded(&id, now)?;
            session.flush(now)?;
            let name = &session.exercise(&id)?.name;
            if session.is_expanded(&id) {
                println!("Expanded '{name}'.");
            } else {
                println!("Collapsed '{name}'.");
            }
        }

        // --- Set Commands ---
        cli::Commands::AddSet { exercise } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            session.add_set(&id, now)?;
            session.flush(now)?;
            let exercise = session.exercise(&id)?;
            println!("Added set {} to '{}'.", exercise.sets.len(), exercise.name);
        }
        cli::Commands::RemoveSet { exercise } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            let before = session.exercise(&id)?.sets.len();
            session.remove_last_set(&id, now)?;
            session.flush(now)?;
            let exercise = session.exercise(&id)?;
            if exercise.sets.len() < before {
                println!("Removed set {} from '{}'.", before, exercise.name);
            } else {
                println!("'{}' keeps its last remaining set.", exercise.name);
            }
        }
        cli::Commands::Set {
            exercise,
            number,
            weight,
            reps,
            left,
            right,
            distance,
            time,
        } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            let set_id = resolve_set_id(&session, &id, number)?;
            let mut changes = Vec::new();
            if let Some(v) = weight {
                changes.push(SetChange::Weight(v));
            }
            if let Some(v) = reps {
                changes.push(SetChange::Reps(v));
            }
            if let Some(v) = left {
                changes.push(SetChange::RepsLeft(v));
            }
            if let Some(v) = right {
                changes.push(SetChange::RepsRight(v));
            }
            if let Some(v) = distance {
                changes.push(SetChange::Distance(v));
            }
            if let Some(v) = time {
                changes.push(SetChange::Time(v));
            }
            if changes.is_empty() {
                bail!(
                    "Nothing to update. Pass at least one of --weight, --reps, --left, --right, --distance, --time."
                );
            }
            for change in changes {
                session.update_set(&id, &set_id, change, now)?;
            }
            session.flush(now)?;
            println!("Updated set {} of '{}'.", number, session.exercise(&id)?.name);
        }
        cli::Commands::Done { exercise, number } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            let id = resolve_exercise_id(&session, &exercise)?;
            let set_id = resolve_set_id(&session, &id, number)?;
            let completed = session.toggle_set_complete(&id, &set_id, now)?;
            session.flush(now)?;
            let exercise = session.exercise(&id)?;
            if completed {
                if let Some(set) = exercise.sets.iter().find(|s| s.id == set_id) {
                    println!(
                        "Completed set {} of '{}': {}.",
                        number,
                        exercise.name,
                        describe_set(set)
                    );
                }
                println!(
                    "Rest timer: {}.",
                    format_elapsed(session.rest().seconds_left())
                );
            } else {
                println!("Set {} of '{}' marked incomplete.", number, exercise.name);
            }
        }
        cli::Commands::Rest { adjust, skip } => {
            let now = Utc::now();
            let mut session = mount_current(&store, &user, now)?;
            if skip {
                session.skip_rest(now);
                session.flush(now)?;
                println!("Rest timer dismissed.");
            } else if let Some(delta) = adjust {
                let duration = session.adjust_rest(delta, now)?;
                session.flush(now)?;
                println!("Default rest is now {}.", format_elapsed(duration));
                if session.rest().is_active() {
                    println!(
                        "Current countdown: {} left.",
                        format_elapsed(session.rest().seconds_left())
                    );
                }
            } else if session.rest().is_active() {
                println!(
                    "Resting: {} left (default {}).",
                    format_elapsed(session.rest().seconds_left()),
                    format_elapsed(session.rest().duration())
                );
            } else {
                println!(
                    "No rest countdown running (default {}).",
                    format_elapsed(session.rest().duration())
                );
            }
        }

        // --- Browsing Commands ---
        cli::Commands::List { limit } => {
            let workouts = store.workouts(&user);
            if workouts.is_empty() {
                println!("No workouts recorded yet.");
            } else {
                print_workout_table(&workouts, limit);
            }
        }
        cli::Commands::History { name } => {
            let workouts = store.workouts(&user);
            let points = history::exercise_history(&workouts, &name);
            if points.is_empty() {
                println!("No completed sets recorded for '{}'.", name.trim());
            } else {
                print_history_table(&name, &points);
            }
        }
        cli::Commands::Stats { name } => {
            let workouts = store.workouts(&user);
            match history::stats_for(&workouts, &name) {
                Some(stats) => {
                    println!("\n--- Statistics for '{}' ---", name.trim());
                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .set_content_arrangement(ContentArrangement::Dynamic);
                    table.add_row(vec![
                        Cell::new("Last Session").add_attribute(Attribute::Bold),
                        Cell::new(&stats.last),
                    ]);
                    table.add_row(vec![
                        Cell::new("Personal Record").add_attribute(Attribute::Bold),
                        Cell::new(&stats.pr),
                    ]);
                    println!("{table}");
                }
                None => println!("No history for '{}' yet.", name.trim()),
            }
        }
        cli::Commands::Exercises { search } => {
            let workouts = store.workouts(&user);
            let hidden = store.hidden_exercises(&user);
            let mut known = history::known_exercises(&workouts, &hidden);
            if let Some(query) = search {
                let needle = query.trim().to_lowercase();
                known.retain(|k| k.name.to_lowercase().contains(&needle));
            }
            if known.is_empty() {
                println!("No known exercises match.");
            } else {
                print_known_exercise_table(&known);
            }
        }
        cli::Commands::Hide { name } => {
            store
                .hide_exercise(&user, &name)
                .context("Failed to update hidden exercises")?;
            println!(
                "Hidden '{}' from listings. Undo with 'ironlog unhide \"{}\"'.",
                name.trim(),
                name.trim()
            );
        }
        cli::Commands::Unhide { name } => {
            store
                .unhide_exercise(&user, &name)
                .context("Failed to update hidden exercises")?;
            println!("Restored '{}'.", name.trim());
        }
        cli::Commands::Delete { workout_id, yes } => {
            let id = resolve_workout_id(&store, &user, &workout_id)?;
            let workout = store
                .workout_by_id(&user, &id)
                .ok_or_else(|| anyhow!("No workout with ID '{workout_id}'."))?;
            if !yes
                && !confirm(&format!(
                    "Delete workout '{}' from {}?",
                    workout.name,
                    workout
                        .start_time
                        .with_timezone(&Local)
                        .format("%Y-%m-%d")
                ))?
            {
                println!("Kept the workout.");
                return Ok(());
            }
            store
                .delete_workout(&user, &id)
                .context("Failed to delete workout")?;
            println!("Deleted workout '{}'.", workout.name);
        }
        cli::Commands::Presets { goal } => {
            let goal = match goal {
                Some(raw) => parse_goal(&raw).ok_or_else(|| {
                    anyhow!("Unknown goal '{raw}'. Valid: strength, endurance, aesthetics, overall")
                })?,
                None => parse_goal(&config.goal).unwrap_or(Goal::Overall),
            };
            let suggestions = presets::suggested_for(goal);
            print_preset_table(goal, &suggestions);
            println!("Start one with: ironlog start --preset \"<name>\"");
        }
        cli::Commands::Chat { clear, context } => {
            if clear {
                store
                    .clear_chat_history(&user)
                    .context("Failed to clear chat history")?;
                println!("Chat history cleared.");
            } else if context {
                println!("{}", history::recent_workouts_context(&store.workouts(&user)));
            } else {
                let messages = store.chat_history(&user);
                if messages.is_empty() {
                    println!("No chat history stored.");
                } else {
                    for message in messages {
                        let who = match message.role {
                            ChatRole::User => "you",
                            ChatRole::Model => "coach",
                        };
                        println!("[{who}] {}", message.text);
                    }
                }
            }
        }
        cli::Commands::DbPath => {
            println!("Database file is located at: {db_path:?}");
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("IRONLOG_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// --- CLI Specific Helper Functions ---

/// Remounts the saved draft session. Session commands require one.
fn mount_current<'a>(store: &'a Store, user: &str, now: DateTime<Utc>) -> Result<ActiveSession<'a>> {
    let draft = store
        .draft(user)
        .ok_or_else(|| anyhow!("No workout in progress. Start one with 'ironlog start'."))?;
    let edit_id = draft.edit_workout_id;
    Ok(ActiveSession::mount(store, user, edit_id.as_deref(), None, now))
}

/// Resolves a 1-based position or case-insensitive name to an exercise id.
fn resolve_exercise_id(session: &ActiveSession, identifier: &str) -> Result<String> {
    let trimmed = identifier.trim();
    if let Ok(index) = trimmed.parse::<usize>() {
        if index >= 1 && index <= session.exercises().len() {
            return Ok(session.exercises()[index - 1].id.clone());
        }
        bail!(
            "No exercise at position {} (the session has {}).",
            index,
            session.exercises().len()
        );
    }
    session
        .exercises()
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(trimmed))
        .map(|e| e.id.clone())
        .ok_or_else(|| anyhow!("No exercise named '{trimmed}' in the current session."))
}

fn resolve_set_id(session: &ActiveSession, exercise_id: &str, number: usize) -> Result<String> {
    let exercise = session.exercise(exercise_id)?;
    if number == 0 || number > exercise.sets.len() {
        bail!(
            "Exercise '{}' has {} set(s); no set {}.",
            exercise.name,
            exercise.sets.len(),
            number
        );
    }
    Ok(exercise.sets[number - 1].id.clone())
}

/// Resolves a workout id or unique id prefix to the full stored id.
fn resolve_workout_id(store: &Store, user: &str, prefix: &str) -> Result<String> {
    let workouts = store.workouts(user);
    let matches: Vec<&WorkoutSession> = workouts
        .iter()
        .filter(|w| w.id.starts_with(prefix))
        .collect();
    match matches.len() {
        0 => bail!("No workout with ID '{prefix}'."),
        1 => Ok(matches[0].id.clone()),
        n => bail!("Workout ID '{prefix}' is ambiguous ({n} matches)."),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} (y/N): ");
    stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

// --- Display Functions ---

fn print_session(session: &ActiveSession, now: DateTime<Utc>) {
    let mut headline = format!("Workout: {}", session.name());
    if session.edit_workout_id().is_some() {
        headline.push_str(" (editing)");
    }
    println!("\n{headline}");

    if session.timer().has_started() {
        let state = if session.timer().is_running() {
            "running"
        } else {
            "paused"
        };
        println!(
            "Elapsed: {} ({state})",
            format_elapsed(session.elapsed_seconds(now))
        );
    } else {
        println!("Clock starts with the first exercise.");
    }
    if session.rest().is_active() {
        println!(
            "Rest: {} left (default {})",
            format_elapsed(session.rest().seconds_left()),
            format_elapsed(session.rest().duration())
        );
    }

    if session.exercises().is_empty() {
        println!("No exercises yet. Add one with 'add-exercise <name>'.");
        return;
    }

    for (index, exercise) in session.exercises().iter().enumerate() {
        let mut line = format!("\n{}. {}", index + 1, exercise.name);
        if let Some(category) = exercise.category {
            line.push_str(&format!(" [{category}]"));
        }
        if exercise.is_unilateral {
            line.push_str(" [unilateral]");
        }
        println!("{line}");
        if let Some(stats) = session.stats(&exercise.id) {
            println!("   Last: {}  PR: {}", stats.last, stats.pr);
        }
        if session.notes_open(&exercise.id) {
            if let Some(notes) = exercise.notes.as_deref() {
                println!("   Notes: {notes}");
            }
        }
        if session.is_expanded(&exercise.id) {
            print_set_table(exercise, session.ghost_sets(&exercise.id));
        } else {
            let completed = exercise.sets.iter().filter(|s| s.completed).count();
            println!(
                "   {} set(s), {} completed (collapsed; 'expand {}' to show)",
                exercise.sets.len(),
                completed,
                index + 1
            );
        }
    }
}

fn print_set_table(exercise: &Exercise, ghost: Option<&[ExerciseSet]>) {
    let mut table = Table::new();
    let header_color = Color::Green;
    let mut header = vec![Cell::new("Set").fg(header_color)];
    if exercise.is_cardio() {
        header.push(Cell::new("Miles").fg(header_color));
        header.push(Cell::new("Minutes").fg(header_color));
    } else if exercise.is_unilateral {
        header.push(Cell::new("lbs").fg(header_color));
        header.push(Cell::new("L").fg(header_color));
        header.push(Cell::new("R").fg(header_color));
    } else {
        header.push(Cell::new("lbs").fg(header_color));
        header.push(Cell::new("Reps").fg(header_color));
    }
    header.push(Cell::new("Done").fg(header_color));
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for (index, set) in exercise.sets.iter().enumerate() {
        let ghost_set = ghost.and_then(|sets| sets.get(index));
        let mut row = vec![Cell::new((index + 1).to_string())];
        if exercise.is_cardio() {
            row.push(float_cell(set.distance, ghost_set.map(|g| g.distance)));
            row.push(float_cell(set.time, ghost_set.map(|g| g.time)));
        } else if exercise.is_unilateral {
            row.push(float_cell(set.weight, ghost_set.map(|g| g.weight)));
            row.push(int_cell(set.reps_left, ghost_set.map(|g| g.reps_left)));
            row.push(int_cell(set.reps_right, ghost_set.map(|g| g.reps_right)));
        } else {
            row.push(float_cell(set.weight, ghost_set.map(|g| g.weight)));
            row.push(int_cell(set.reps, ghost_set.map(|g| g.reps)));
        }
        row.push(Cell::new(if set.completed { "✓" } else { "" }));
        table.add_row(row);
    }
    println!("{table}");
}

// Zero-valued fields show the prior session's value dimmed as a placeholder.
fn float_cell(value: f64, ghost: Option<f64>) -> Cell {
    if value == 0.0 {
        if let Some(g) = ghost.filter(|g| *g != 0.0) {
            return Cell::new(format!("({})", trim_float(g))).fg(Color::DarkGrey);
        }
    }
    Cell::new(trim_float(value))
}

fn int_cell(value: i64, ghost: Option<i64>) -> Cell {
    if value == 0 {
        if let Some(g) = ghost.filter(|g| *g != 0) {
            return Cell::new(format!("({g})")).fg(Color::DarkGrey);
        }
    }
    Cell::new(value.to_string())
}

#[allow(clippy::cast_possible_truncation)]
fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn describe_set(set: &ExerciseSet) -> String {
    if set.distance != 0.0 || set.time != 0.0 {
        format!(
            "{}mi / {}m",
            trim_float(set.distance),
            trim_float(set.time)
        )
    } else if set.reps_left != 0 || set.reps_right != 0 {
        format!(
            "{}lbs x (L:{} R:{})",
            trim_float(set.weight),
            set.reps_left,
            set.reps_right
        )
    } else {
        format!("{}lbs x {}", trim_float(set.weight), set.reps)
    }
}

fn print_workout_table(workouts: &[WorkoutSession], limit: usize) {
    let mut table = Table::new();
    let header_color = Color::Green;
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(header_color),
            Cell::new("Date").fg(header_color),
            Cell::new("Name").fg(header_color),
            Cell::new("Exercises").fg(header_color),
            Cell::new("Completed Sets").fg(header_color),
            Cell::new("Duration").fg(header_color),
        ]);

    for workout in workouts.iter().take(limit) {
        let completed = workout
            .exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.completed)
            .count();
        let duration = workout.end_time.map_or("-".to_string(), |end| {
            format_elapsed((end - workout.start_time).num_seconds().max(0))
        });
        table.add_row(vec![
            Cell::new(short_id(&workout.id)),
            Cell::new(
                workout
                    .start_time
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
            Cell::new(&workout.name),
            Cell::new(workout.exercises.len().to_string()),
            Cell::new(completed.to_string()),
            Cell::new(duration),
        ]);
    }
    println!("{table}");
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn print_history_table(name: &str, points: &[HistoryPoint]) {
    let mut table = Table::new();
    let header_color = Color::Cyan;
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date").fg(header_color),
            Cell::new("Best Set").fg(header_color),
            Cell::new("Max").fg(header_color),
            Cell::new("Volume").fg(header_color),
        ]);
    for point in points {
        table.add_row(vec![
            Cell::new(
                point
                    .date
                    .with_timezone(&Local)
                    .format("%Y-%m-%d")
                    .to_string(),
            ),
            Cell::new(describe_set(&point.best_set)),
            Cell::new(trim_float(point.max_value)),
            Cell::new(trim_float(point.volume)),
        ]);
    }
    println!("\n--- History for '{}' ---", name.trim());
    println!("{table}");
}

fn print_known_exercise_table(known: &[KnownExercise]) {
    let mut table = Table::new();
    let header_color = Color::Magenta;
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(header_color),
            Cell::new("Category").fg(header_color),
            Cell::new("Unilateral").fg(header_color),
        ]);
    for exercise in known {
        table.add_row(vec![
            Cell::new(&exercise.name),
            Cell::new(exercise.category.map_or("-".to_string(), |c| c.to_string())),
            Cell::new(if exercise.is_unilateral { "yes" } else { "-" }),
        ]);
    }
    println!("{table}");
}

fn print_preset_table(goal: Goal, suggestions: &[&PresetWorkout]) {
    let mut table = Table::new();
    let header_color = Color::Yellow;
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").fg(header_color),
            Cell::new("Goal").fg(header_color),
            Cell::new("Exercises").fg(header_color),
            Cell::new("Description").fg(header_color),
        ]);
    for preset in suggestions {
        let exercises = preset
            .exercises
            .iter()
            .map(|e| format!("{} {}x{}", e.name, e.sets, e.reps))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(preset.name),
            Cell::new(preset.goal.to_string()),
            Cell::new(exercises),
            Cell::new(preset.description),
        ]);
    }
    println!("\n--- Suggested presets ({goal}) ---");
    println!("{table}");
}

// src/cli.rs
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI workout logger with live session tracking", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Profile to operate on (defaults to the configured user)
    #[arg(long, global = true)]
    pub user: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a workout session, or resume one already in progress
    Start {
        /// Name for the workout
        #[arg(long)]
        name: Option<String>,
        /// Reopen a finished workout for editing (ID or ID prefix)
        #[arg(long, value_name = "WORKOUT_ID", conflicts_with_all = &["preset", "template"])]
        edit: Option<String>,
        /// Seed the session from a catalog preset
        #[arg(long, conflicts_with = "template")]
        preset: Option<String>,
        /// Seed the session from a JSON template file
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
    },
    /// Show the session in progress
    Status,
    /// Follow the session live, advancing timers once per second
    Watch,
    /// Rename the workout in progress
    Name { name: String },
    /// Pause or resume the workout clock
    Pause,
    /// Save the workout and close the session
    Finish,
    /// Discard the session without saving
    Cancel {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Add an exercise to the session
    AddExercise {
        /// Name of the exercise (e.g. "Bench Press", "Running")
        name: String,
        /// Category: free weight, cable, machine, bodyweight, cardio, other
        #[arg(short, long)]
        category: Option<String>,
        /// Track left and right reps separately
        #[arg(long)]
        unilateral: bool,
    },
    /// Rename an exercise in the session
    RenameExercise {
        /// Exercise position (1-based) or name
        exercise: String,
        name: String,
    },
    /// Set an exercise's notes (omit the text to clear them)
    Note {
        /// Exercise position (1-based) or name
        exercise: String,
        text: Vec<String>,
    },
    /// Remove an exercise from the session
    RemoveExercise {
        /// Exercise position (1-based) or name
        exercise: String,
    },
    /// Expand or collapse an exercise's set list in status output
    Expand {
        /// Exercise position (1-based) or name
        exercise: String,
    },
    /// Append a set to an exercise
    AddSet {
        /// Exercise position (1-based) or name
        exercise: String,
    },
    /// Remove the last set of an exercise
    RemoveSet {
        /// Exercise position (1-based) or name
        exercise: String,
    },
    /// Update fields of one set
    Set {
        /// Exercise position (1-based) or name
        exercise: String,
        /// Set number (1-based)
        number: usize,
        /// Weight in lbs
        #[arg(short, long)]
        weight: Option<f64>,
        /// Repetitions
        #[arg(short, long)]
        reps: Option<i64>,
        /// Left-side reps (unilateral exercises)
        #[arg(long)]
        left: Option<i64>,
        /// Right-side reps (unilateral exercises)
        #[arg(long)]
        right: Option<i64>,
        /// Distance in miles (cardio)
        #[arg(short, long)]
        distance: Option<f64>,
        /// Time in minutes (cardio)
        #[arg(short, long)]
        time: Option<f64>,
    },
    /// Mark a set complete (or incomplete again)
    Done {
        /// Exercise position (1-based) or name
        exercise: String,
        /// Set number (1-based)
        number: usize,
    },
    /// Show the rest countdown, adjust the default, or dismiss it
    Rest {
        /// Seconds to add to (or, negative, remove from) the default
        #[arg(long, allow_negative_numbers = true)]
        adjust: Option<i64>,
        /// Dismiss the running countdown
        #[arg(long, conflicts_with = "adjust")]
        skip: bool,
    },
    /// List finished workouts
    List {
        /// Show only the last N workouts
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Per-workout progress for an exercise
    History {
        /// Exercise name
        name: String,
    },
    /// Last session and personal record for an exercise
    Stats {
        /// Exercise name
        name: String,
    },
    /// List known exercises from workout history
    Exercises {
        /// Filter by a case-insensitive substring
        #[arg(long)]
        search: Option<String>,
    },
    /// Hide an exercise from listings and suggestions
    Hide { name: String },
    /// Restore a hidden exercise
    Unhide { name: String },
    /// Delete a finished workout (ID or ID prefix)
    Delete {
        workout_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List preset workouts from the catalog
    Presets {
        /// Filter by goal: strength, endurance, aesthetics, overall
        #[arg(long)]
        goal: Option<String>,
    },
    /// Show the stored coach chat history
    Chat {
        /// Clear the stored history
        #[arg(long)]
        clear: bool,
        /// Print the recent-workout context block instead
        #[arg(long, conflicts_with = "clear")]
        context: bool,
    },
    /// Show the path to the database file
    DbPath,
    /// Generate shell completion scripts
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

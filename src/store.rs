// src/store.rs
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::draft::WorkoutDraft;
use crate::models::{ChatMessage, WorkoutSession};
use crate::timer::DEFAULT_REST_SECS;

// Custom Error type for storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection failed")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode record for key '{0}'")]
    Encode(String, #[source] serde_json::Error),
}

const DB_FILE_NAME: &str = "ironlog.sqlite";

// Per-user record keys, one JSON document each.
fn workouts_key(user: &str) -> String {
    format!("ironlog_workouts_{}", user)
}
fn hidden_key(user: &str) -> String {
    format!("ironlog_hidden_exercises_{}", user)
}
fn draft_key(user: &str) -> String {
    format!("ironlog_workout_draft_{}", user)
}
fn chat_key(user: &str) -> String {
    format!("ironlog_chat_history_{}", user)
}
fn rest_pref_key(user: &str) -> String {
    format!("ironlog_rest_pref_{}", user)
}

/// Gets the path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir().ok_or(StoreError::DataDir)?;
    let app_dir = data_dir.join("ironlog"); // Same dir name as config for consistency
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Key-value persistence for everything durable: workout lists, the
/// in-progress draft, hidden exercise names, chat history and the rest
/// preference. Records are JSON documents keyed per user.
///
/// Reads never fail: a missing or corrupt record degrades to its empty
/// default with a warning. Writes surface real errors.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens (and initializes if needed) the store at `path`.
    ///
    /// # Errors
    /// Returns `StoreError` if the database cannot be opened or the
    /// schema cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(Store { conn })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Store { conn })
    }

    fn init(conn: &Connection) -> Result<(), StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw: Option<String> = match self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
        {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "storage read failed, treating record as absent");
                return None;
            }
        };
        let raw = raw?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "corrupt record, treating as absent");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)
            .map_err(|e| StoreError::Encode(key.to_string(), e))?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, json],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    // --- Workouts ---

    pub fn workouts(&self, user: &str) -> Vec<WorkoutSession> {
        self.read(&workouts_key(user)).unwrap_or_default()
    }

    /// Upserts a workout: an existing id is overwritten in place, a new
    /// one is prepended (newest first). Saving a workout that uses a
    /// hidden exercise name un-hides that name.
    ///
    /// # Errors
    /// Returns `StoreError` if the write fails.
    pub fn save_workout(&self, user: &str, workout: &WorkoutSession) -> Result<(), StoreError> {
        let mut workouts = self.workouts(user);
        match workouts.iter().position(|w| w.id == workout.id) {
            Some(index) => workouts[index] = workout.clone(),
            None => workouts.insert(0, workout.clone()),
        }
        self.write(&workouts_key(user), &workouts)?;

        let hidden = self.hidden_exercises(user);
        if !hidden.is_empty() {
            let used: HashSet<String> = workout
                .exercises
                .iter()
                .map(|e| e.name.trim().to_lowercase())
                .filter(|n| !n.is_empty())
                .collect();
            let remaining: Vec<String> = hidden
                .iter()
                .filter(|h| !used.contains(&h.to_lowercase()))
                .cloned()
                .collect();
            if remaining.len() != hidden.len() {
                self.write(&hidden_key(user), &remaining)?;
            }
        }
        Ok(())
    }

    /// # Errors
    /// Returns `StoreError` if the write fails.
    pub fn delete_workout(&self, user: &str, id: &str) -> Result<(), StoreError> {
        let workouts: Vec<WorkoutSession> = self
            .workouts(user)
            .into_iter()
            .filter(|w| w.id != id)
            .collect();
        self.write(&workouts_key(user), &workouts)
    }

    pub fn workout_by_id(&self, user: &str, id: &str) -> Option<WorkoutSession> {
        self.workouts(user).into_iter().find(|w| w.id == id)
    }

    // --- Draft ---

    pub fn draft(&self, user: &str) -> Option<WorkoutDraft> {
        self.read(&draft_key(user))
    }

    /// # Errors
    /// Returns `StoreError` if the write fails.
    pub fn save_draft(&self, user: &str, draft: &WorkoutDraft) -> Result<(), StoreError> {
        self.write(&draft_key(user), draft)
    }

    /// # Errors
    /// Returns `StoreError` if the delete fails.
    pub fn clear_draft(&self, user: &str) -> Result<(), StoreError> {
        self.remove(&draft_key(user))
    }

    // --- Hidden exercise names ---

    pub fn hidden_exercises(&self, user: &str) -> Vec<String> {
        self.read(&hidden_key(user)).unwrap_or_default()
    }

    /// # Errors
    /// Returns `StoreError` if the write fails.
    pub fn hide_exercise(&self, user: &str, name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Ok(());
        }
        let mut hidden = self.hidden_exercises(user);
        if !hidden.iter().any(|h| h == name) {
            hidden.push(name.to_string());
            self.write(&hidden_key(user), &hidden)?;
        }
        Ok(())
    }

    /// # Errors
    /// Returns `StoreError` if the write fails.
    pub fn unhide_exercise(&self, user: &str, name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Ok(());
        }
        let remaining: Vec<String> = self
            .hidden_exercises(user)
            .into_iter()
            .filter(|h| h != name)
            .collect();
        self.write(&hidden_key(user), &remaining)
    }

    // --- Preferences ---

    /// Preferred rest countdown length in seconds; 90 when never saved.
    pub fn rest_timer_preference(&self, user: &str) -> i64 {
        self.read(&rest_pref_key(user)).unwrap_or(DEFAULT_REST_SECS)
    }

    /// # Errors
    /// Returns `StoreError` if the write fails.
    pub fn save_rest_timer_preference(&self, user: &str, seconds: i64) -> Result<(), StoreError> {
        self.write(&rest_pref_key(user), &seconds)
    }

    // --- Chat history ---

    pub fn chat_history(&self, user: &str) -> Vec<ChatMessage> {
        self.read(&chat_key(user)).unwrap_or_default()
    }

    /// # Errors
    /// Returns `StoreError` if the write fails.
    pub fn save_chat_history(&self, user: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        self.write(&chat_key(user), &messages)
    }

    /// # Errors
    /// Returns `StoreError` if the delete fails.
    pub fn clear_chat_history(&self, user: &str) -> Result<(), StoreError> {
        self.remove(&chat_key(user))
    }
}

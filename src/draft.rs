// src/draft.rs
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Exercise;

/// Quiet period after the last state change before the draft is written.
pub const AUTOSAVE_DEBOUNCE_MS: i64 = 1000;

/// Persisted shadow of an in-progress session: everything needed to
/// rebuild the exercise list, the workout clock and a running rest
/// countdown after a restart. One draft per user; `edit_workout_id` is
/// the relevance key checked on mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDraft {
    #[serde(default)]
    pub edit_workout_id: Option<String>,
    pub workout_name: String,
    pub start_time: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub has_started: bool,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub timer_paused: bool,
    #[serde(default)]
    pub timer_paused_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "totalPausedTime")]
    pub total_paused_ms: i64,
    #[serde(default)]
    pub notes_expanded: HashMap<String, bool>,
    #[serde(default)]
    pub exercises_expanded: HashMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_timer: Option<RestTimerSnapshot>,
}

fn default_true() -> bool {
    true
}

/// Rest countdown as persisted inside a draft. `end_time` is the
/// authoritative field for recovery; `time_left` is a display cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestTimerSnapshot {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub time_left: i64,
    pub duration: i64,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

/// Debounced draft-write scheduler, modeled as a cancellable deadline.
///
/// Each state change replaces the pending deadline, so a burst of edits
/// produces exactly one write of the final state once the burst goes
/// quiet for [`AUTOSAVE_DEBOUNCE_MS`].
#[derive(Debug, Clone, Default)]
pub struct Autosave {
    deadline: Option<DateTime<Utc>>,
}

impl Autosave {
    pub fn new() -> Self {
        Autosave { deadline: None }
    }

    /// Schedules a write one quiet period from `now`, cancelling any
    /// write already pending.
    pub fn schedule(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + Duration::milliseconds(AUTOSAVE_DEBOUNCE_MS));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Reports whether the scheduled write has come due, clearing the
    /// deadline when it has.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> bool {
        self.deadline.is_some()
    }
}

// src/timer.rs
use chrono::{DateTime, Duration, Utc};

/// Rest countdown length used when the user has never saved a preference.
pub const DEFAULT_REST_SECS: i64 = 90;

/// Tracks total workout duration across start/pause/resume cycles.
///
/// All state is absolute wall-clock timestamps plus an accumulated paused
/// duration, so elapsed time is recomputed from scratch on every query and
/// survives process restarts and missed ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutTimer {
    start_time: DateTime<Utc>,
    has_started: bool,
    running: bool,
    paused_at: Option<DateTime<Utc>>,
    total_paused_ms: i64,
}

impl WorkoutTimer {
    /// A timer that has not started yet. `now` is a placeholder start
    /// until `start` stamps the real one.
    pub fn new(now: DateTime<Utc>) -> Self {
        WorkoutTimer {
            start_time: now,
            has_started: false,
            running: false,
            paused_at: None,
            total_paused_ms: 0,
        }
    }

    /// Rebuilds a timer from persisted draft fields.
    pub fn restore(
        start_time: DateTime<Utc>,
        has_started: bool,
        running: bool,
        paused_at: Option<DateTime<Utc>>,
        total_paused_ms: i64,
    ) -> Self {
        WorkoutTimer {
            start_time,
            has_started,
            running,
            paused_at,
            total_paused_ms,
        }
    }

    /// Begins the workout clock. Does nothing if already started.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.has_started {
            return;
        }
        self.start_time = now;
        self.has_started = true;
        self.running = true;
        self.paused_at = None;
        self.total_paused_ms = 0;
    }

    /// Pause/resume. Starts the timer if it never started.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if !self.has_started {
            self.start(now);
        } else if self.running {
            self.running = false;
            self.paused_at = Some(now);
        } else {
            if let Some(paused_at) = self.paused_at {
                self.total_paused_ms += (now - paused_at).num_milliseconds();
            }
            self.paused_at = None;
            self.running = true;
        }
    }

    /// Whole seconds on the clock, never negative.
    ///
    /// While paused the pause instant stands in for `now`; a paused timer
    /// with no pause instant (a finished workout re-opened for editing)
    /// reports plain wall time since start.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        if !self.has_started {
            return 0;
        }
        let reference = if self.running {
            now
        } else if let Some(paused_at) = self.paused_at {
            paused_at
        } else {
            let ms = (now - self.start_time).num_milliseconds();
            return ms.max(0) / 1000;
        };
        let ms = (reference - self.start_time).num_milliseconds() - self.total_paused_ms;
        ms.max(0) / 1000
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    pub fn total_paused_ms(&self) -> i64 {
        self.total_paused_ms
    }
}

/// Result of advancing the rest countdown by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestTick {
    /// No countdown in progress.
    Idle,
    /// Still counting; carries the seconds remaining.
    Counting(i64),
    /// Just reached zero. The host should notify the user.
    Finished,
}

/// Countdown started when a set is completed.
///
/// `duration` is the current default length; triggering always restarts
/// the countdown from it, even mid-count. The last completed set wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RestTimer {
    active: bool,
    seconds_left: i64,
    duration: i64,
}

impl RestTimer {
    pub fn new(duration: i64) -> Self {
        RestTimer {
            active: false,
            seconds_left: 0,
            duration: duration.max(0),
        }
    }

    /// Rebuilds the countdown from a persisted absolute end time. The
    /// remaining time is recomputed against `now`; if the end time has
    /// already passed the timer comes back inactive and no completion
    /// notification is owed.
    pub fn restore(duration: i64, end_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let mut timer = RestTimer::new(duration);
        if let Some(end_time) = end_time {
            let remaining = ((end_time - now).num_milliseconds() as f64 / 1000.0).ceil() as i64;
            if remaining > 0 {
                timer.active = true;
                timer.seconds_left = remaining;
            }
        }
        timer
    }

    /// Starts (or restarts) the countdown at the full default duration.
    pub fn trigger(&mut self) {
        self.seconds_left = self.duration;
        self.active = true;
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> RestTick {
        if !self.active {
            return RestTick::Idle;
        }
        if self.seconds_left > 0 {
            self.seconds_left -= 1;
        }
        if self.seconds_left <= 0 {
            self.active = false;
            self.seconds_left = 0;
            return RestTick::Finished;
        }
        RestTick::Counting(self.seconds_left)
    }

    /// Changes the default duration by `delta` seconds, clamped at zero,
    /// and shifts any running countdown by the same amount. Returns the
    /// new default so the caller can persist it as the user preference.
    pub fn adjust(&mut self, delta: i64) -> i64 {
        self.duration = (self.duration + delta).max(0);
        if self.active {
            self.seconds_left = (self.seconds_left + delta).max(0);
        }
        self.duration
    }

    /// Stops the countdown immediately, with no notification.
    pub fn skip(&mut self) {
        self.active = false;
        self.seconds_left = 0;
    }

    /// Absolute instant the running countdown will reach zero.
    pub fn end_time(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.active {
            Some(now + Duration::seconds(self.seconds_left))
        } else {
            None
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn seconds_left(&self) -> i64 {
        self.seconds_left
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }
}

//! Timer state structure and pure transition logic

use serde::{Deserialize, Serialize};

/// Default session (work) interval in minutes
pub const DEFAULT_SESSION_MINUTES: u64 = 25;
/// Default break interval in minutes
pub const DEFAULT_BREAK_MINUTES: u64 = 5;
/// Interval lengths are clamped to [MIN_LENGTH_MINUTES, MAX_LENGTH_MINUTES]
pub const MIN_LENGTH_MINUTES: u64 = 1;
pub const MAX_LENGTH_MINUTES: u64 = 60;

/// Which interval the clock is currently counting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Session,
    Break,
}

impl Phase {
    /// The other phase
    pub fn flipped(self) -> Self {
        match self {
            Phase::Session => Phase::Break,
            Phase::Break => Phase::Session,
        }
    }

    /// Human-readable label for display and logging
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Session => "Session",
            Phase::Break => "Break",
        }
    }
}

/// Outcome of a single one-second tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown continues with this many seconds left
    Running(u64),
    /// The countdown hit zero; a phase flip should be scheduled
    Expired,
}

/// Full countdown state: interval lengths, remaining time, play flag, phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    /// Session interval length in minutes, [1, 60]
    pub session_length: u64,
    /// Break interval length in minutes, [1, 60]
    pub break_length: u64,
    /// Seconds remaining in the current phase
    pub time_left: u64,
    /// Whether the countdown is actively ticking
    pub playing: bool,
    /// Current phase
    pub phase: Phase,
}

impl TimerState {
    /// Create the startup state: 25 minute session, 5 minute break, paused
    pub fn new() -> Self {
        Self {
            session_length: DEFAULT_SESSION_MINUTES,
            break_length: DEFAULT_BREAK_MINUTES,
            time_left: DEFAULT_SESSION_MINUTES * 60,
            playing: false,
            phase: Phase::Session,
        }
    }

    /// Length in minutes of the phase currently counting down
    pub fn active_length(&self) -> u64 {
        match self.phase {
            Phase::Session => self.session_length,
            Phase::Break => self.break_length,
        }
    }

    /// Adjust the session or break length by `delta` minutes.
    ///
    /// Rejected (no state change) while playing. The result is clamped to
    /// [1, 60]; `time_left` is resynchronized to the active phase's new
    /// length. Returns whether the addressed length actually changed.
    pub fn adjust_length(&mut self, kind: Phase, delta: i64) -> bool {
        if self.playing {
            return false;
        }

        let current = match kind {
            Phase::Session => self.session_length,
            Phase::Break => self.break_length,
        };
        let adjusted = (current as i64 + delta)
            .clamp(MIN_LENGTH_MINUTES as i64, MAX_LENGTH_MINUTES as i64)
            as u64;

        match kind {
            Phase::Session => self.session_length = adjusted,
            Phase::Break => self.break_length = adjusted,
        }

        // While paused, the visible countdown tracks the active length
        self.time_left = self.active_length() * 60;
        adjusted != current
    }

    /// Flip the play flag; the caller owns starting/stopping the schedule
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// One one-second decrement. Saturates at zero.
    pub fn tick(&mut self) -> TickOutcome {
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.time_left)
        }
    }

    /// Switch to the other phase and rewind `time_left` to its full length
    pub fn flip_phase(&mut self) {
        self.phase = self.phase.flipped();
        self.time_left = self.active_length() * 60;
    }

    /// Restore all fields to the startup defaults
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Remaining time formatted as zero-padded `MM:SS`
    pub fn formatted_time_left(&self) -> String {
        format_time(self.time_left)
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Format whole seconds as zero-padded `MM:SS` (3600 -> "60:00")
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

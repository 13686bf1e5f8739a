//! Pomodoro Clock - a countdown timer alternating session and break intervals
//!
//! This library provides the timer state machine, the countdown scheduling
//! task, and the console presentation layer around them.

pub mod config;
pub mod state;
pub mod services;
pub mod tasks;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, ControlEvent, Phase, TickOutcome, TimerState};
pub use services::{Alarm, CommandAlarm, SilentAlarm};
pub use tasks::{countdown_task, PHASE_FLIP_GRACE};
pub use utils::shutdown_signal;

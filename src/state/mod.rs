//! State management module
//!
//! This module contains the pure timer state machine and the shared
//! application state that wraps it.

pub mod timer_state;
pub mod app_state;

// Re-export main types
pub use timer_state::{format_time, Phase, TickOutcome, TimerState};
pub use app_state::{AppState, ControlEvent};

//! Background tasks module
//!
//! This module contains the countdown task that runs alongside the console.

pub mod countdown;

// Re-export main functions
pub use countdown::{countdown_task, PHASE_FLIP_GRACE};

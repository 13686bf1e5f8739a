//! Presentation layer module
//!
//! Console rendering and command handling for the timer.

pub mod console;

// Re-export main functions
pub use console::{render_task, run_console};

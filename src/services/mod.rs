//! External collaborators: the audio alarm and desktop notifications

pub mod alarm;
pub mod notify;

// Re-export main types and functions
pub use alarm::{check_player_available, Alarm, CommandAlarm, SilentAlarm};
pub use notify::send_phase_notification;

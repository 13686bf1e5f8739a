//! Desktop notifications for phase completions

use notify_rust::Notification;

use crate::state::Phase;

/// Notify the user that a phase finished and what comes next.
///
/// `completed` is the phase that just hit zero; `next_minutes` is the length
/// of the phase about to start.
pub fn send_phase_notification(completed: Phase, next_minutes: u64) -> Result<(), String> {
    let body = match completed {
        Phase::Session => format!(
            "Session complete! Time for a {}-minute break.",
            next_minutes
        ),
        Phase::Break => format!(
            "Break is over! Starting {}-minute session.",
            next_minutes
        ),
    };

    Notification::new()
        .summary("Pomodoro Clock")
        .body(&body)
        .timeout(0) // No auto-dismiss
        .show()
        .map_err(|e| format!("Failed to send notification: {}", e))?;

    Ok(())
}

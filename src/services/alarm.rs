//! Audio alarm handle owned by the timer controller

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use tracing::{debug, warn};

/// The audio alert resource: played once per phase completion, paused and
/// rewound on reset.
pub trait Alarm: Send + Sync {
    fn play(&self);
    fn pause(&self);
    fn rewind(&self);
}

/// Alarm backed by an external audio player process (e.g. `paplay beep.wav`).
///
/// `pause` kills the in-flight player; `rewind` drops the process handle so
/// the next `play` starts the sound from the beginning.
pub struct CommandAlarm {
    command: String,
    sound: PathBuf,
    child: Mutex<Option<Child>>,
}

impl CommandAlarm {
    pub fn new(command: String, sound: PathBuf) -> Self {
        Self {
            command,
            sound,
            child: Mutex::new(None),
        }
    }

    fn stop_child(&self) {
        let Ok(mut slot) = self.child.lock() else {
            warn!("Alarm child lock poisoned");
            return;
        };
        if let Some(mut child) = slot.take() {
            if let Err(e) = child.kill() {
                debug!("Alarm process already finished: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl Alarm for CommandAlarm {
    fn play(&self) {
        // At most one player at a time; a replay restarts the sound
        self.stop_child();

        let spawned = Command::new(&self.command)
            .arg(&self.sound)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                debug!("Alarm playing via {} {}", self.command, self.sound.display());
                if let Ok(mut slot) = self.child.lock() {
                    *slot = Some(child);
                }
            }
            // Playback failure is logged, never propagated
            Err(e) => warn!("Failed to play alarm with {}: {}", self.command, e),
        }
    }

    fn pause(&self) {
        self.stop_child();
    }

    fn rewind(&self) {
        // A fresh process always starts at the beginning, so rewinding is
        // just making sure no in-flight playback survives
        self.stop_child();
    }
}

/// Fallback used when no player is available or audio is disabled
pub struct SilentAlarm;

impl Alarm for SilentAlarm {
    fn play(&self) {
        debug!("Silent alarm: phase completion beep suppressed");
    }

    fn pause(&self) {}

    fn rewind(&self) {}
}

/// Check that the configured audio player can be executed
pub fn check_player_available(command: &str) -> Result<(), String> {
    Command::new(command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|_| format!("audio player '{}' is not available", command))?;

    debug!("Audio player '{}' is available", command);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_player_reports_error() {
        let err = check_player_available("definitely-not-a-real-player-binary").unwrap_err();
        assert!(err.contains("not available"));
    }

    #[test]
    fn test_silent_alarm_is_callable() {
        let alarm = SilentAlarm;
        alarm.play();
        alarm.pause();
        alarm.rewind();
    }
}

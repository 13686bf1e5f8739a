//! Console presentation layer
//!
//! Reads line commands from stdin, forwards them as controller operations,
//! and renders timer snapshots as they arrive on the watch channel.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, error};

use crate::state::{AppState, Phase, TimerState};

/// A discrete user intent, parsed from one input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    Reset,
    AdjustLength(Phase, i64),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim().to_lowercase().as_str() {
            "p" | "play" | "pause" => Ok(Command::TogglePlay),
            "r" | "reset" => Ok(Command::Reset),
            "s+" => Ok(Command::AdjustLength(Phase::Session, 1)),
            "s-" => Ok(Command::AdjustLength(Phase::Session, -1)),
            "b+" => Ok(Command::AdjustLength(Phase::Break, 1)),
            "b-" => Ok(Command::AdjustLength(Phase::Break, -1)),
            "status" => Ok(Command::Status),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}' (try 'help')", other)),
        }
    }
}

/// JSON shape for the `status` command
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub time_left: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<String>,
}

impl StatusResponse {
    pub fn from_state(state: &AppState) -> Result<Self, String> {
        let timer = state.snapshot()?;
        let (last_action, last_action_time) = state.get_last_action();
        Ok(Self {
            time_left: timer.formatted_time_left(),
            timer,
            last_action,
            last_action_time: last_action_time.map(|t| t.to_rfc3339()),
        })
    }
}

/// One rendered countdown line, e.g. `[Session] 24:59  (playing)`
pub fn render_snapshot(timer: &TimerState) -> String {
    format!(
        "[{}] {}  session {}m / break {}m  ({})",
        timer.phase.label(),
        timer.formatted_time_left(),
        timer.session_length,
        timer.break_length,
        if timer.playing { "playing" } else { "paused" },
    )
}

pub fn print_help() {
    println!("Commands:");
    println!("  p       - play/pause the countdown");
    println!("  r       - reset to 25/5 defaults");
    println!("  s+, s-  - session length +/- 1 minute");
    println!("  b+, b-  - break length +/- 1 minute");
    println!("  status  - print the current state as JSON");
    println!("  q       - quit");
}

/// Render every snapshot published by the controller until the channel closes
pub async fn render_task(mut snapshot_rx: watch::Receiver<TimerState>) {
    loop {
        {
            let timer = snapshot_rx.borrow_and_update();
            println!("{}", render_snapshot(&timer));
        }
        if snapshot_rx.changed().await.is_err() {
            debug!("Snapshot channel closed, render task stopping");
            break;
        }
    }
}

/// Apply one parsed command against the controller. Returns false when the
/// console should exit.
pub fn dispatch(state: &Arc<AppState>, command: Command) -> bool {
    let result = match command {
        Command::TogglePlay => state.toggle_play().map(|_| ()),
        Command::Reset => state.reset().map(|_| ()),
        Command::AdjustLength(kind, delta) => state.adjust_length(kind, delta).map(|_| ()),
        Command::Status => StatusResponse::from_state(state).and_then(|status| {
            serde_json::to_string_pretty(&status)
                .map(|json| println!("{}", json))
                .map_err(|e| format!("Failed to serialize status: {}", e))
        }),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Quit => return false,
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
    }
    true
}

/// Main console loop: parse stdin lines into commands and dispatch them
pub async fn run_console(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if !dispatch(&state, command) {
                    break;
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::alarm::testing::RecordingAlarm;

    #[test]
    fn test_command_parsing() {
        assert_eq!("p".parse::<Command>().unwrap(), Command::TogglePlay);
        assert_eq!("  PLAY ".parse::<Command>().unwrap(), Command::TogglePlay);
        assert_eq!("r".parse::<Command>().unwrap(), Command::Reset);
        assert_eq!(
            "s+".parse::<Command>().unwrap(),
            Command::AdjustLength(Phase::Session, 1)
        );
        assert_eq!(
            "b-".parse::<Command>().unwrap(),
            Command::AdjustLength(Phase::Break, -1)
        );
        assert_eq!("status".parse::<Command>().unwrap(), Command::Status);
        assert_eq!("q".parse::<Command>().unwrap(), Command::Quit);
        assert!("frobnicate".parse::<Command>().is_err());
    }

    #[test]
    fn test_render_snapshot_defaults() {
        let rendered = render_snapshot(&TimerState::new());
        assert_eq!(rendered, "[Session] 25:00  session 25m / break 5m  (paused)");
    }

    #[test]
    fn test_dispatch_adjusts_and_quits() {
        let state = Arc::new(AppState::new(Arc::new(RecordingAlarm::default()), false));
        assert!(dispatch(&state, Command::AdjustLength(Phase::Session, -1)));
        assert_eq!(state.snapshot().unwrap().session_length, 24);
        assert!(!dispatch(&state, Command::Quit));
    }

    #[test]
    fn test_status_response_serializes() {
        let state = Arc::new(AppState::new(Arc::new(RecordingAlarm::default()), false));
        state.toggle_play().unwrap();
        let status = StatusResponse::from_state(&state).unwrap();
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"playing\":true"));
        assert!(json.contains("\"phase\":\"session\""));
        assert!(json.contains("\"time_left\":\"25:00\""));
    }
}

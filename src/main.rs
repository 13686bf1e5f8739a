//! Pomodoro Clock - a countdown timer alternating session and break intervals
//!
//! This is the main entry point for the pomodoro-clock application.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use pomodoro_clock::{
    config::Config,
    services::{check_player_available, Alarm, CommandAlarm, SilentAlarm},
    state::AppState,
    tasks::countdown_task,
    ui::{render_task, run_console},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_clock={}", config.log_level()))
        .init();

    info!("Starting pomodoro-clock v1.0.0");

    // Pick the alarm backend; a missing player downgrades to silence
    let alarm: Arc<dyn Alarm> = if config.no_sound {
        Arc::new(SilentAlarm)
    } else {
        match check_player_available(&config.alarm_command) {
            Ok(()) => Arc::new(CommandAlarm::new(
                config.alarm_command.clone(),
                PathBuf::from(&config.sound),
            )),
            Err(e) => {
                warn!("{}; the alarm will be silent", e);
                Arc::new(SilentAlarm)
            }
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(alarm, !config.no_notify));

    // Start the countdown background task
    let countdown_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_task(countdown_state).await;
    });

    // Render snapshots as the controller publishes them
    let snapshot_rx = state.subscribe_snapshots();
    tokio::spawn(async move {
        render_task(snapshot_rx).await;
    });

    println!("Pomodoro Clock - 25 minute sessions, 5 minute breaks");
    pomodoro_clock::ui::console::print_help();

    // Run the console until quit or a shutdown signal
    tokio::select! {
        result = run_console(Arc::clone(&state)) => {
            if let Err(e) = result {
                tracing::error!("Console error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Pomodoro clock shutdown complete");
    Ok(())
}

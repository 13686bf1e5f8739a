//! Countdown background task
//!
//! Owns the one-second tick schedule and the two-second grace delay between
//! phases. Control events from [`AppState`] start, pause, and reset it; ticks
//! are strictly serialized because a single task drives the whole schedule.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval, sleep};
use tracing::{debug, error, info, warn};

use crate::services::send_phase_notification;
use crate::state::{AppState, ControlEvent, Phase, TickOutcome};

/// Delay between a countdown hitting zero and the phase flip
pub const PHASE_FLIP_GRACE: Duration = Duration::from_secs(2);

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What ended a countdown run
enum RunEnd {
    /// Paused, reset, or left paused after a grace-window flip
    Stopped,
    /// The control channel closed; the task should exit
    Shutdown,
}

/// Background task that drives the countdown while the timer is playing
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task");

    let mut control_rx = state.subscribe_control();

    loop {
        // Idle until the user starts playing
        match control_rx.recv().await {
            Ok(ControlEvent::Play) => {}
            Ok(_) => continue,
            Err(RecvError::Lagged(missed)) => {
                warn!("Countdown task lagged, missed {} control events", missed);
                continue;
            }
            Err(RecvError::Closed) => break,
        }

        if let RunEnd::Shutdown = run_countdown(&state, &mut control_rx).await {
            break;
        }
    }

    info!("Countdown task stopped");
}

/// Tick once per second until paused, reset, or shut down. A tick that hits
/// zero fires the alarm, waits out the grace delay, flips the phase, and
/// resumes unless the user paused in the meantime.
async fn run_countdown(
    state: &Arc<AppState>,
    control_rx: &mut broadcast::Receiver<ControlEvent>,
) -> RunEnd {
    let mut ticker = interval(TICK_PERIOD);
    // Consume the immediate first fire so the first decrement lands a full
    // second after play
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match state.tick() {
                    Ok(TickOutcome::Running(remaining)) => {
                        debug!("Tick: {} seconds remaining", remaining);
                    }
                    Ok(TickOutcome::Expired) => {
                        // Ticking halts before the grace delay is scheduled,
                        // so the flip is serialized relative to ticks
                        match complete_phase(state, control_rx).await {
                            PhaseEnd::Flipped => {
                                let playing = state.snapshot()
                                    .map(|s| s.playing)
                                    .unwrap_or(false);
                                if !playing {
                                    // Paused during the grace window: the flip
                                    // was honored but the countdown stays put
                                    return RunEnd::Stopped;
                                }
                                ticker = interval(TICK_PERIOD);
                                ticker.tick().await;
                            }
                            PhaseEnd::Cancelled => return RunEnd::Stopped,
                            PhaseEnd::Shutdown => return RunEnd::Shutdown,
                        }
                    }
                    Err(e) => {
                        error!("Failed to tick timer state: {}", e);
                        return RunEnd::Stopped;
                    }
                }
            }

            event = control_rx.recv() => {
                match event {
                    Ok(ControlEvent::Pause) | Ok(ControlEvent::Reset) => {
                        debug!("Countdown schedule cancelled");
                        return RunEnd::Stopped;
                    }
                    Ok(ControlEvent::Play) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Countdown task lagged, missed {} control events", missed);
                    }
                    Err(RecvError::Closed) => return RunEnd::Shutdown,
                }
            }
        }
    }
}

/// How the phase-completion grace window ended
enum PhaseEnd {
    /// The grace delay elapsed and the phase was flipped
    Flipped,
    /// A reset arrived first; the pending flip was cancelled
    Cancelled,
    Shutdown,
}

/// Fire the alert, wait out the grace delay, then flip the phase.
///
/// Reset cancels the pending flip. Pause does not: the flip is still honored,
/// and the caller decides whether to keep ticking based on the play flag.
async fn complete_phase(
    state: &Arc<AppState>,
    control_rx: &mut broadcast::Receiver<ControlEvent>,
) -> PhaseEnd {
    let completed = match state.snapshot() {
        Ok(snapshot) => snapshot.phase,
        Err(e) => {
            error!("Failed to read timer state: {}", e);
            return PhaseEnd::Cancelled;
        }
    };

    info!("{} complete, flipping phase in {:?}", completed.label(), PHASE_FLIP_GRACE);

    // The alert fires exactly once per phase completion
    state.alarm.play();
    notify_completion(state, completed);

    let grace = sleep(PHASE_FLIP_GRACE);
    tokio::pin!(grace);

    loop {
        tokio::select! {
            _ = &mut grace => {
                if let Err(e) = state.flip_phase() {
                    error!("Failed to flip phase: {}", e);
                    return PhaseEnd::Cancelled;
                }
                return PhaseEnd::Flipped;
            }

            event = control_rx.recv() => {
                match event {
                    Ok(ControlEvent::Reset) => {
                        debug!("Pending phase flip cancelled by reset");
                        return PhaseEnd::Cancelled;
                    }
                    // Pause during the grace window does not cancel the flip
                    Ok(ControlEvent::Pause) | Ok(ControlEvent::Play) => {}
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Countdown task lagged, missed {} control events", missed);
                    }
                    Err(RecvError::Closed) => return PhaseEnd::Shutdown,
                }
            }
        }
    }
}

fn notify_completion(state: &Arc<AppState>, completed: Phase) {
    if !state.notifications {
        return;
    }

    let next_minutes = match state.snapshot() {
        Ok(snapshot) => match completed.flipped() {
            Phase::Session => snapshot.session_length,
            Phase::Break => snapshot.break_length,
        },
        Err(_) => return,
    };

    if let Err(e) = send_phase_notification(completed, next_minutes) {
        warn!("{}", e);
    }
}

//! Main application state management

use std::sync::{Arc, Mutex};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::services::Alarm;
use super::{Phase, TickOutcome, TimerState};

/// Control events emitted towards the countdown task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    Play,
    Pause,
    Reset,
}

/// Owns the timer state, the alarm handle, and the channels that drive the
/// countdown task and the presentation layer.
pub struct AppState {
    /// Countdown state, single-writer through the methods below
    pub timer: Mutex<TimerState>,
    /// Audio alert resource, exclusively owned by the controller
    pub alarm: Arc<dyn Alarm>,
    /// Whether phase completions raise a desktop notification
    pub notifications: bool,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Channel for play/pause/reset notifications to the countdown task
    pub control_tx: broadcast::Sender<ControlEvent>,
    /// Channel for state snapshots to the presentation layer
    pub snapshot_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerState>,
}

impl AppState {
    /// Create a new AppState with default timer values
    pub fn new(alarm: Arc<dyn Alarm>, notifications: bool) -> Self {
        let (control_tx, _) = broadcast::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerState::new());

        Self {
            timer: Mutex::new(TimerState::new()),
            alarm,
            notifications,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            control_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Lock the timer state, apply the update, record the action, and
    /// publish a snapshot for the presentation layer.
    fn update_timer<T, F>(&self, action: &str, updater: F) -> Result<T, String>
    where
        F: FnOnce(&mut TimerState) -> T,
    {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        let result = updater(&mut timer);
        let snapshot = timer.clone();
        drop(timer); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to publish timer snapshot: {}", e);
        }

        Ok(result)
    }

    fn notify_control(&self, event: ControlEvent) {
        // No receiver just means the countdown task is gone
        if self.control_tx.send(event).is_err() {
            warn!("No countdown task listening for {:?}", event);
        }
    }

    /// Adjust the session or break length by a signed minute delta.
    /// Silently clamped to [1, 60]; a no-op while playing.
    pub fn adjust_length(&self, kind: Phase, delta: i64) -> Result<TimerState, String> {
        let action = match kind {
            Phase::Session => "adjust-session",
            Phase::Break => "adjust-break",
        };
        self.update_timer(action, |timer| {
            if timer.adjust_length(kind, delta) {
                info!("{} length set to {} minutes",
                      kind.label(), match kind {
                          Phase::Session => timer.session_length,
                          Phase::Break => timer.break_length,
                      });
            }
            timer.clone()
        })
    }

    /// Flip between playing and paused, notifying the countdown task
    pub fn toggle_play(&self) -> Result<TimerState, String> {
        let snapshot = self.update_timer("toggle-play", |timer| {
            timer.toggle_play();
            timer.clone()
        })?;

        if snapshot.playing {
            info!("Countdown started: {} {}",
                  snapshot.phase.label(), snapshot.formatted_time_left());
            self.notify_control(ControlEvent::Play);
        } else {
            info!("Countdown paused at {}", snapshot.formatted_time_left());
            self.notify_control(ControlEvent::Pause);
        }

        Ok(snapshot)
    }

    /// One one-second decrement, invoked by the countdown task while playing
    pub fn tick(&self) -> Result<TickOutcome, String> {
        self.update_timer("tick", |timer| timer.tick())
    }

    /// Flip the phase after the grace delay and rewind the countdown to the
    /// new phase's full length.
    pub fn flip_phase(&self) -> Result<TimerState, String> {
        let snapshot = self.update_timer("phase-flip", |timer| {
            timer.flip_phase();
            timer.clone()
        })?;
        info!("Phase flipped to {} ({})",
              snapshot.phase.label(), snapshot.formatted_time_left());
        Ok(snapshot)
    }

    /// Restore startup defaults, cancel any pending schedule, and halt and
    /// rewind the alarm.
    pub fn reset(&self) -> Result<TimerState, String> {
        let snapshot = self.update_timer("reset", |timer| {
            timer.reset();
            timer.clone()
        })?;

        self.notify_control(ControlEvent::Reset);

        // The alarm is paused and rewound regardless of playback state
        self.alarm.pause();
        self.alarm.rewind();

        info!("Timer reset to defaults");
        Ok(snapshot)
    }

    /// Get a copy of the current timer state
    pub fn snapshot(&self) -> Result<TimerState, String> {
        self.timer.lock()
            .map(|timer| timer.clone())
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Subscribe to state snapshots (presentation layer)
    pub fn subscribe_snapshots(&self) -> watch::Receiver<TimerState> {
        self.snapshot_tx.subscribe()
    }

    /// Subscribe to control events (countdown task)
    pub fn subscribe_control(&self) -> broadcast::Receiver<ControlEvent> {
        self.control_tx.subscribe()
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::alarm::testing::RecordingAlarm;

    fn state_with_recording_alarm() -> (Arc<AppState>, Arc<RecordingAlarm>) {
        let alarm = Arc::new(RecordingAlarm::default());
        let state = Arc::new(AppState::new(alarm.clone(), false));
        (state, alarm)
    }

    #[test]
    fn test_adjust_length_noop_while_playing() {
        let (state, _) = state_with_recording_alarm();
        state.toggle_play().unwrap();
        let snapshot = state.adjust_length(Phase::Session, 1).unwrap();
        assert_eq!(snapshot.session_length, 25);
        assert_eq!(snapshot.time_left, 1500);
    }

    #[test]
    fn test_adjust_length_resyncs_while_paused() {
        let (state, _) = state_with_recording_alarm();
        let snapshot = state.adjust_length(Phase::Session, 1).unwrap();
        assert_eq!(snapshot.session_length, 26);
        assert_eq!(snapshot.time_left, 26 * 60);
    }

    #[test]
    fn test_toggle_play_emits_control_events() {
        let (state, _) = state_with_recording_alarm();
        let mut control_rx = state.subscribe_control();

        let playing = state.toggle_play().unwrap();
        assert!(playing.playing);
        assert_eq!(control_rx.try_recv().unwrap(), ControlEvent::Play);

        let paused = state.toggle_play().unwrap();
        assert!(!paused.playing);
        assert_eq!(control_rx.try_recv().unwrap(), ControlEvent::Pause);
    }

    #[test]
    fn test_pause_preserves_progress() {
        let (state, _) = state_with_recording_alarm();
        state.toggle_play().unwrap();
        for _ in 0..10 {
            state.tick().unwrap();
        }
        let paused = state.toggle_play().unwrap();
        assert_eq!(paused.time_left, 1490);
    }

    #[test]
    fn test_tick_reports_expiry() {
        let (state, _) = state_with_recording_alarm();
        state.toggle_play().unwrap();
        for _ in 0..1499 {
            assert!(matches!(state.tick().unwrap(), TickOutcome::Running(_)));
        }
        assert_eq!(state.tick().unwrap(), TickOutcome::Expired);
    }

    #[test]
    fn test_reset_restores_defaults_and_rewinds_alarm() {
        let (state, alarm) = state_with_recording_alarm();
        state.adjust_length(Phase::Break, 3).unwrap();
        state.toggle_play().unwrap();
        state.tick().unwrap();

        let snapshot = state.reset().unwrap();
        assert_eq!(snapshot, TimerState::new());
        assert_eq!(alarm.calls(), vec!["pause", "rewind"]);
    }

    #[test]
    fn test_reset_emits_reset_event() {
        let (state, _) = state_with_recording_alarm();
        let mut control_rx = state.subscribe_control();
        state.reset().unwrap();
        assert_eq!(control_rx.try_recv().unwrap(), ControlEvent::Reset);
    }

    #[test]
    fn test_snapshot_channel_tracks_mutations() {
        let (state, _) = state_with_recording_alarm();
        let snapshot_rx = state.subscribe_snapshots();
        state.adjust_length(Phase::Session, -1).unwrap();
        assert_eq!(snapshot_rx.borrow().session_length, 24);
    }

    #[test]
    fn test_last_action_tracking() {
        let (state, _) = state_with_recording_alarm();
        state.toggle_play().unwrap();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("toggle-play"));
        assert!(time.is_some());
    }
}

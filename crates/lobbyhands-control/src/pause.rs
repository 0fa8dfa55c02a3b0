//! Pause, restart and shutdown state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::operation::{OperationDetail, OperationLog, OperationRecord};

/// Archived operation records kept for diagnostics.
pub const HISTORY_CAPACITY: usize = 50;

/// Sleep step of [`PauseController::await_pause`].
const PAUSE_POLL: Duration = Duration::from_millis(500);

/// State change published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Paused,
    Resumed { paused_for: Duration },
    RestartRequested { reason: String },
    ShutdownRequested,
    OperationStarted { name: String, detail: OperationDetail },
}

impl std::fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlEvent::Paused => write!(f, "PAUSED"),
            ControlEvent::Resumed { paused_for } => {
                write!(f, "RESUMED after {:.1}s", paused_for.as_secs_f64())
            }
            ControlEvent::RestartRequested { reason } => write!(f, "RESTART: {}", reason),
            ControlEvent::ShutdownRequested => write!(f, "SHUTDOWN"),
            ControlEvent::OperationStarted { name, .. } => write!(f, "OPERATION: {}", name),
        }
    }
}

/// Snapshot returned by [`PauseController::status`].
#[derive(Debug, Clone, Serialize)]
pub struct ControlStatus {
    pub paused: bool,
    pub shutdown_requested: bool,
    pub restart_requested: bool,
    pub restart_reason: Option<String>,
    pub operation: Option<String>,
    pub operation_detail: OperationDetail,
    pub operation_secs: f64,
    pub total_paused_secs: f64,
}

/// `pause_started_at` is `Some` exactly while paused.
#[derive(Debug, Default)]
struct PauseClock {
    pause_started_at: Option<Instant>,
    total_paused: Duration,
}

impl PauseClock {
    fn open_interval(&self, now: Instant) -> Duration {
        self.pause_started_at
            .map(|at| now.saturating_duration_since(at))
            .unwrap_or_default()
    }
}

/// Shared control state consulted by every blocking operation.
///
/// Each concern has its own lock; the flags are independent of each other.
pub struct PauseController {
    clock: Mutex<PauseClock>,
    shutdown: AtomicBool,
    restart: Mutex<Option<String>>,
    operations: Mutex<OperationLog>,
    events: broadcast::Sender<ControlEvent>,
}

impl PauseController {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            clock: Mutex::new(PauseClock::default()),
            shutdown: AtomicBool::new(false),
            restart: Mutex::new(None),
            operations: Mutex::new(OperationLog::new(HISTORY_CAPACITY)),
            events,
        }
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ControlEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ControlEvent) {
        debug!("Control event: {}", event);
        let _ = self.events.send(event);
    }

    // ---- pause ----

    /// Flip the paused flag. Returns the new state.
    pub fn toggle_pause(&self) -> bool {
        let event = {
            let mut clock = self.clock.lock();
            Self::flip(&mut clock)
        };
        let paused = matches!(event, ControlEvent::Paused);
        self.publish(event);
        paused
    }

    /// Pause if running. Returns false if already paused.
    pub fn force_pause(&self) -> bool {
        let event = {
            let mut clock = self.clock.lock();
            if clock.pause_started_at.is_some() {
                return false;
            }
            Self::flip(&mut clock)
        };
        self.publish(event);
        true
    }

    /// Resume if paused. Returns false if not paused.
    pub fn force_resume(&self) -> bool {
        let event = {
            let mut clock = self.clock.lock();
            if clock.pause_started_at.is_none() {
                return false;
            }
            Self::flip(&mut clock)
        };
        self.publish(event);
        true
    }

    fn flip(clock: &mut PauseClock) -> ControlEvent {
        let now = Instant::now();
        match clock.pause_started_at.take() {
            Some(started) => {
                let paused_for = now.saturating_duration_since(started);
                clock.total_paused += paused_for;
                info!(
                    "Resumed after {:.1}s (total paused {:.1}s)",
                    paused_for.as_secs_f64(),
                    clock.total_paused.as_secs_f64()
                );
                ControlEvent::Resumed { paused_for }
            }
            None => {
                clock.pause_started_at = Some(now);
                info!("Paused");
                ControlEvent::Paused
            }
        }
    }

    pub fn is_paused(&self) -> bool {
        self.clock.lock().pause_started_at.is_some()
    }

    /// Sum of closed pause intervals.
    pub fn total_paused(&self) -> Duration {
        self.clock.lock().total_paused
    }

    /// Wall-clock time since `start` minus every paused interval, never negative.
    pub fn elapsed_active_time(&self, start: Instant) -> Duration {
        let now = Instant::now();
        let clock = self.clock.lock();
        now.saturating_duration_since(start)
            .saturating_sub(clock.total_paused)
            .saturating_sub(clock.open_interval(now))
    }

    /// Sleep while paused. Returns on resume or shutdown.
    pub async fn await_pause(&self) {
        while self.is_paused() && !self.is_shutdown_requested() {
            tokio::time::sleep(PAUSE_POLL).await;
        }
    }

    // ---- restart / shutdown ----

    /// Set the shutdown flag for the rest of the process lifetime.
    pub fn request_shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            info!("Shutdown requested");
            self.publish(ControlEvent::ShutdownRequested);
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Request a session restart. Only the first reason is kept.
    pub fn request_restart(&self, reason: impl Into<String>) {
        let reason = reason.into();
        {
            let mut restart = self.restart.lock();
            if restart.is_some() {
                debug!("Restart already pending, ignoring: {}", reason);
                return;
            }
            *restart = Some(reason.clone());
        }
        info!(reason = %reason, "Restart requested");
        self.publish(ControlEvent::RestartRequested { reason });
    }

    pub fn is_restart_requested(&self) -> bool {
        self.restart.lock().is_some()
    }

    pub fn restart_reason(&self) -> Option<String> {
        self.restart.lock().clone()
    }

    /// Clear a pending restart once the supervisor has acted on it.
    pub fn clear_restart(&self) {
        self.restart.lock().take();
    }

    fn is_cancelled(&self) -> bool {
        self.is_shutdown_requested() || self.is_restart_requested()
    }

    /// Cooperative yield point.
    ///
    /// Returns false without blocking if a restart or shutdown is pending.
    /// While paused, blocks until resumed and then re-checks.
    pub async fn check_checkpoint(&self, operation: &str) -> bool {
        if self.is_cancelled() {
            debug!(operation, "Checkpoint refused: cancellation pending");
            return false;
        }
        if self.is_paused() {
            debug!(operation, "Checkpoint waiting for resume");
            self.await_pause().await;
            if self.is_cancelled() {
                return false;
            }
        }
        true
    }

    // ---- operations ----

    /// Archive the current operation and start a new one.
    pub fn set_current_operation(&self, name: impl Into<String>, detail: OperationDetail) {
        let record = OperationRecord::new(name, detail.clone());
        let name = record.name.clone();
        self.operations.lock().start(record);
        info!(operation = %name, "Operation started");
        self.publish(ControlEvent::OperationStarted { name, detail });
    }

    /// Merge keys into the current operation's detail map.
    pub fn update_operation_details(&self, detail: OperationDetail) {
        self.operations.lock().merge_detail(detail);
    }

    pub fn current_operation(&self) -> Option<OperationRecord> {
        self.operations.lock().current().cloned()
    }

    /// Most recent archived operations, newest last.
    pub fn history(&self, limit: usize) -> Vec<OperationRecord> {
        self.operations.lock().recent(limit)
    }

    pub fn status(&self) -> ControlStatus {
        let (paused, total_paused) = {
            let clock = self.clock.lock();
            (clock.pause_started_at.is_some(), clock.total_paused)
        };
        let restart_reason = self.restart_reason();
        let current = self.current_operation();
        ControlStatus {
            paused,
            shutdown_requested: self.is_shutdown_requested(),
            restart_requested: restart_reason.is_some(),
            restart_reason,
            operation: current.as_ref().map(|r| r.name.clone()),
            operation_detail: current.as_ref().map(|r| r.detail.clone()).unwrap_or_default(),
            operation_secs: current.map(|r| r.running_for().as_secs_f64()).unwrap_or(0.0),
            total_paused_secs: total_paused.as_secs_f64(),
        }
    }
}

impl Default for PauseController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "pause_tests.rs"]
mod tests;

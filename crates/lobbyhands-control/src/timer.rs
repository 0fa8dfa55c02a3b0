//! Pause-aware timeouts.
//!
//! Callers poll these helpers from their own loops; nothing here preempts
//! work in progress.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::pause::PauseController;

/// Poll period of [`wait_with_timeout`].
const WAIT_POLL: Duration = Duration::from_secs(1);

/// Minimum spacing between progress callbacks.
const PROGRESS_EVERY: Duration = Duration::from_secs(5);

/// Outcome of a timeout check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerVerdict {
    /// Budget not exhausted.
    Continue { elapsed: Duration },
    /// Active time reached the timeout.
    TimedOut { elapsed: Duration },
    /// A restart or shutdown is pending.
    Cancelled,
}

impl TimerVerdict {
    pub fn should_continue(&self) -> bool {
        matches!(self, TimerVerdict::Continue { .. })
    }

    /// Active time at the check. Zero when cancelled.
    pub fn elapsed(&self) -> Duration {
        match self {
            TimerVerdict::Continue { elapsed } | TimerVerdict::TimedOut { elapsed } => *elapsed,
            TimerVerdict::Cancelled => Duration::ZERO,
        }
    }
}

/// Checkpoint, then compare active time since `start` against `timeout`.
pub async fn check_with_timeout(
    control: &PauseController,
    operation: &str,
    timeout: Duration,
    start: Instant,
) -> TimerVerdict {
    if !control.check_checkpoint(operation).await {
        return TimerVerdict::Cancelled;
    }

    let elapsed = control.elapsed_active_time(start);
    if elapsed >= timeout {
        info!(
            operation,
            elapsed_secs = elapsed.as_secs_f64(),
            timeout_secs = timeout.as_secs_f64(),
            "Operation timed out"
        );
        return TimerVerdict::TimedOut { elapsed };
    }
    TimerVerdict::Continue { elapsed }
}

/// Block until `timeout` of active time passes or the operation is cancelled.
///
/// `progress` receives `(elapsed, remaining)` at most every five seconds.
pub async fn wait_with_timeout<F>(
    control: &PauseController,
    operation: &str,
    timeout: Duration,
    mut progress: Option<F>,
) -> TimerVerdict
where
    F: FnMut(Duration, Duration),
{
    let start = Instant::now();
    let mut last_report: Option<Instant> = None;

    loop {
        let verdict = check_with_timeout(control, operation, timeout, start).await;
        let TimerVerdict::Continue { elapsed } = verdict else {
            debug!(operation, ?verdict, "Wait finished");
            return verdict;
        };

        if let Some(callback) = progress.as_mut() {
            let due = last_report.is_none_or(|at| at.elapsed() >= PROGRESS_EVERY);
            if due {
                callback(elapsed, timeout.saturating_sub(elapsed));
                last_report = Some(Instant::now());
            }
        }

        tokio::time::sleep(WAIT_POLL).await;
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;

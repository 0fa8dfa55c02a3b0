//! Session supervisor.
//!
//! Runs lobby sessions back to back. A restart outcome is recorded,
//! announced and acknowledged, then the next session starts after a
//! pause-aware delay.

use std::sync::Arc;
use std::time::Duration;

use lobbyhands_config::SupervisorConfig;
use lobbyhands_control::{timer, PauseController, TimerVerdict};
use lobbyhands_notify::{Notification, NotifyHandle};
use lobbyhands_store::{StatEventKind, StatsJournal};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::lobby::{SessionOutcome, SessionRunner};

/// Why the supervisor stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorExit {
    Shutdown,
    RestartLimit,
}

/// Summary returned by [`Supervisor::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorReport {
    pub exit: SupervisorExit,
    pub sessions: u32,
    pub restarts: u32,
}

pub struct Supervisor<R: SessionRunner> {
    runner: R,
    settings: SupervisorConfig,
    control: Arc<PauseController>,
    stats: Arc<StatsJournal>,
    notify: NotifyHandle,
}

impl<R: SessionRunner> Supervisor<R> {
    pub fn new(
        runner: R,
        settings: SupervisorConfig,
        control: Arc<PauseController>,
        stats: Arc<StatsJournal>,
        notify: NotifyHandle,
    ) -> Self {
        Self {
            runner,
            settings,
            control,
            stats,
            notify,
        }
    }

    /// Run sessions until shutdown or the restart limit.
    pub async fn run(&self) -> SupervisorReport {
        let mut sessions = 0u32;
        let mut restarts = 0u32;

        loop {
            sessions += 1;
            self.stats.record(StatEventKind::SessionStart).await;
            info!(session = sessions, "Starting lobby session");

            let reason = match self.runner.run_session().await {
                Ok(SessionOutcome::Shutdown) => {
                    return self.report(SupervisorExit::Shutdown, sessions, restarts);
                }
                Ok(SessionOutcome::Restart(reason)) => reason,
                Err(e) => {
                    error!(session = sessions, error = %e, "Lobby session failed");
                    format!("session error: {}", e)
                }
            };

            if self.control.is_shutdown_requested() {
                return self.report(SupervisorExit::Shutdown, sessions, restarts);
            }

            restarts += 1;
            warn!(restarts, %reason, "Restarting lobby session");
            self.stats
                .record(StatEventKind::Restart {
                    reason: reason.clone(),
                })
                .await;
            self.notify.post(Notification::restart(&reason));
            self.control.clear_restart();

            let limit = self.settings.max_restarts;
            if limit > 0 && restarts >= limit {
                warn!(limit, "Restart limit reached");
                return self.report(SupervisorExit::RestartLimit, sessions, restarts);
            }

            if !self.restart_delay().await {
                return self.report(SupervisorExit::Shutdown, sessions, restarts);
            }
        }
    }

    /// Wait out the restart delay. False when shutdown was requested.
    async fn restart_delay(&self) -> bool {
        let delay = self.settings.restart_delay();
        if delay.is_zero() {
            return !self.control.is_shutdown_requested();
        }
        info!(delay_secs = delay.as_secs(), "Waiting before next session");
        match timer::wait_with_timeout(
            &self.control,
            "restart delay",
            delay,
            None::<fn(Duration, Duration)>,
        )
        .await
        {
            TimerVerdict::Cancelled if self.control.is_shutdown_requested() => false,
            // A restart requested during the delay is satisfied by the
            // session about to start.
            TimerVerdict::Cancelled => {
                self.control.clear_restart();
                true
            }
            _ => true,
        }
    }

    fn report(&self, exit: SupervisorExit, sessions: u32, restarts: u32) -> SupervisorReport {
        info!(?exit, sessions, restarts, "Supervisor stopped");
        SupervisorReport {
            exit,
            sessions,
            restarts,
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;

//! The lobby session loop.
//!
//! A session first waits for the match accept button, then polls at
//! `tick_interval` until its active-time budget runs out, a host death is
//! spotted, or a restart/shutdown is requested. Between polls it drives the
//! infinite-mode automaton and fires due triggers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lobbyhands_config::LobbyConfig;
use lobbyhands_control::{timer, OperationDetail, PauseController, TimerVerdict};
use lobbyhands_notify::{Notification, NotifyHandle, NotifyLevel};
use lobbyhands_protocols::{Actuator, Position, Region, Vision};
use lobbyhands_store::{HostDeathCause, StatEventKind, StatsJournal};
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::automaton::{CycleAutomaton, CycleOutcome};
use crate::engine::TriggerEngine;
use crate::error::RunLoopResult;

/// Operation name of a lobby session.
pub const LOBBY_OPERATION: &str = "afk_lobby_monitor";

/// Operation name of the accept button search.
pub const ACCEPT_OPERATION: &str = "accept_search";

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Start a new session.
    Restart(String),
    /// Stop for good.
    Shutdown,
}

/// Something the supervisor can run session after session.
#[async_trait]
pub trait SessionRunner: Send + Sync {
    async fn run_session(&self) -> RunLoopResult<SessionOutcome>;
}

/// Active-time schedule of a periodic duty.
struct Every {
    period: Duration,
    next: Duration,
}

impl Every {
    /// First run at `first`, then every `period`.
    fn starting_at(first: Duration, period: Duration) -> Self {
        Self {
            period,
            next: first,
        }
    }

    fn due(&mut self, elapsed: Duration) -> bool {
        if elapsed < self.next {
            return false;
        }
        self.next = elapsed + self.period;
        true
    }
}

/// Lobby monitoring with optional infinite mode.
pub struct LobbyMonitorLoop {
    settings: LobbyConfig,
    control: Arc<PauseController>,
    vision: Arc<dyn Vision>,
    actuator: Arc<dyn Actuator>,
    stats: Arc<StatsJournal>,
    notify: NotifyHandle,
    infinite: Option<Infinite>,
}

struct Infinite {
    automaton: Arc<CycleAutomaton>,
    engine: Arc<TriggerEngine>,
}

impl LobbyMonitorLoop {
    pub fn new(
        settings: LobbyConfig,
        control: Arc<PauseController>,
        vision: Arc<dyn Vision>,
        actuator: Arc<dyn Actuator>,
        stats: Arc<StatsJournal>,
        notify: NotifyHandle,
    ) -> Self {
        Self {
            settings,
            control,
            vision,
            actuator,
            stats,
            notify,
            infinite: None,
        }
    }

    /// Run infinite mode and its triggers during sessions.
    pub fn with_infinite(
        mut self,
        automaton: Arc<CycleAutomaton>,
        engine: Arc<TriggerEngine>,
    ) -> Self {
        self.infinite = Some(Infinite { automaton, engine });
        self
    }

    fn session_detail(&self) -> OperationDetail {
        let mut detail = OperationDetail::new();
        detail.insert("timeout_secs".into(), json!(self.settings.timeout_secs));
        detail.insert("infinite_enabled".into(), json!(self.infinite.is_some()));
        detail
    }

    /// Find and click the accept button. `None` means accepted.
    async fn await_accept(&self) -> Option<SessionOutcome> {
        let timeout = self.settings.accept_timeout();
        let pattern = &self.settings.accept_pattern;
        let mut detail = OperationDetail::new();
        detail.insert("timeout_secs".into(), json!(self.settings.accept_timeout_secs));
        detail.insert("pattern".into(), json!(pattern));
        self.control.set_current_operation(ACCEPT_OPERATION, detail);
        info!(timeout_secs = timeout.as_secs(), %pattern, "Waiting for the accept button");

        let start = Instant::now();
        let mut attempt: u64 = 0;
        loop {
            let elapsed = match timer::check_with_timeout(
                &self.control,
                "accept search",
                timeout,
                start,
            )
            .await
            {
                TimerVerdict::Continue { elapsed } => elapsed,
                TimerVerdict::TimedOut { elapsed } => {
                    warn!(
                        elapsed_secs = elapsed.as_secs(),
                        attempts = attempt,
                        "Accept button not found in time"
                    );
                    return Some(SessionOutcome::Restart("accept timeout".to_string()));
                }
                TimerVerdict::Cancelled => return Some(self.cancelled()),
            };
            attempt += 1;

            if let Some(position) = self.find_accept().await {
                match self.actuator.move_and_click(position.x, position.y, 1).await {
                    Ok(()) => {
                        info!(
                            attempt,
                            %position,
                            elapsed_secs = elapsed.as_secs(),
                            "Accept clicked"
                        );
                        return None;
                    }
                    Err(e) => warn!(attempt, error = %e, "Could not click accept"),
                }
            }

            tokio::time::sleep(self.settings.accept_poll()).await;
        }
    }

    async fn find_accept(&self) -> Option<Position> {
        let (width, height) = match self.vision.screen_size().await {
            Ok(size) => size,
            Err(e) => {
                warn!(error = %e, "Could not read screen size");
                return None;
            }
        };
        match self
            .vision
            .find_specific_text(&self.settings.accept_pattern, Region::new(0, 0, width, height))
            .await
        {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, "Accept search failed");
                None
            }
        }
    }

    async fn monitor(&self) -> SessionOutcome {
        let start = Instant::now();
        let timeout = self.settings.timeout();

        self.control
            .set_current_operation(LOBBY_OPERATION, self.session_detail());
        if let Some(infinite) = &self.infinite {
            infinite.automaton.reset_session();
        }
        info!(
            timeout_secs = timeout.as_secs(),
            infinite = self.infinite.is_some(),
            "Lobby session started"
        );

        let mut attempts = self.infinite.as_ref().map(|i| {
            Every::starting_at(Duration::ZERO, i.automaton.settings().attempt_interval())
        });
        let death_period = self.settings.death_check_interval();
        let mut death_checks = Every::starting_at(death_period, death_period);
        let status_period = self.settings.status_interval();
        let mut status = Every::starting_at(status_period, status_period);
        let gold_every = u64::from(self.settings.gold_check_every_ticks);
        let mut tick: u64 = 0;

        loop {
            let elapsed = match timer::check_with_timeout(
                &self.control,
                "lobby monitor",
                timeout,
                start,
            )
            .await
            {
                TimerVerdict::Continue { elapsed } => elapsed,
                TimerVerdict::TimedOut { elapsed } => {
                    warn!(
                        elapsed_secs = elapsed.as_secs(),
                        "Lobby session timed out"
                    );
                    return SessionOutcome::Restart("lobby timeout".to_string());
                }
                TimerVerdict::Cancelled => return self.cancelled(),
            };
            tick += 1;

            if let (Some(infinite), Some(schedule)) = (&self.infinite, attempts.as_mut()) {
                if schedule.due(elapsed) {
                    self.infinite_step(infinite).await;
                }
            }

            if death_checks.due(elapsed) && self.death_frame_detected().await {
                self.stats
                    .record(StatEventKind::HostDeath {
                        cause: HostDeathCause::DeathFrame,
                        details: "death color in host avatar frame".to_string(),
                    })
                    .await;
                return SessionOutcome::Restart("host death frame".to_string());
            }

            if gold_every > 0 && tick % gold_every == 0 && self.gold_text_seen().await {
                self.stats
                    .record(StatEventKind::HostDeath {
                        cause: HostDeathCause::GoldText,
                        details: format!("'{}' in chat", self.settings.gold_pattern),
                    })
                    .await;
                return SessionOutcome::Restart("gold text in chat".to_string());
            }

            if status.due(elapsed) {
                self.report_status(elapsed, timeout);
            }

            tokio::time::sleep(self.settings.tick_interval()).await;
        }
    }

    fn cancelled(&self) -> SessionOutcome {
        if self.control.is_shutdown_requested() {
            info!("Lobby session stopping for shutdown");
            return SessionOutcome::Shutdown;
        }
        let reason = self
            .control
            .restart_reason()
            .unwrap_or_else(|| "restart requested".to_string());
        info!(%reason, "Lobby session stopping for restart");
        SessionOutcome::Restart(reason)
    }

    /// One automaton step, then fire whatever the cycle count made due.
    async fn infinite_step(&self, infinite: &Infinite) {
        let outcome = infinite.automaton.perform_cycle().await;
        debug!(%outcome, "Infinite step finished");
        if matches!(outcome, CycleOutcome::HeroDead) {
            self.notify.post(Notification::new(
                "Infinite mode",
                "Hero died, waiting for the next round",
                NotifyLevel::Warning,
            ));
        }
        self.control
            .update_operation_details(infinite.automaton.operation_details());

        let cycles = infinite.automaton.counters().total_cycles();
        if cycles == 0 {
            return;
        }
        for due in infinite.engine.evaluate(cycles) {
            self.notify.post(Notification::trigger_fired(
                &due.entity_name,
                due.threshold_cycles,
                cycles,
            ));
            let report = infinite
                .engine
                .fire(&due.entity_id, due.threshold_cycles, cycles)
                .await;
            if report.success {
                self.stats
                    .record(StatEventKind::TriggerFired {
                        entity: due.entity_id.clone(),
                        threshold: due.threshold_cycles,
                        current_cycles: cycles,
                    })
                    .await;
            } else {
                warn!(
                    entity = %due.entity_id,
                    threshold = due.threshold_cycles,
                    message = %report.message,
                    "Trigger did not fire"
                );
            }
        }
    }

    async fn death_frame_detected(&self) -> bool {
        match self.vision.find_death_frame_color().await {
            Ok(reading) => {
                if reading.detected {
                    warn!(
                        pixels = reading.matched_pixels,
                        "Host avatar frame shows death color"
                    );
                }
                reading.detected
            }
            Err(e) => {
                warn!(error = %e, "Death frame check failed");
                false
            }
        }
    }

    /// Open the chat, look for the gold pattern, close the chat.
    async fn gold_text_seen(&self) -> bool {
        if let Err(e) = self.actuator.press_key("enter").await {
            warn!(error = %e, "Could not open chat");
            return false;
        }
        let found = match self.vision.screen_size().await {
            Ok((width, height)) => {
                let region = self.settings.chat_region.resolve(width, height);
                match self
                    .vision
                    .find_specific_text(&self.settings.gold_pattern, region)
                    .await
                {
                    Ok(position) => position,
                    Err(e) => {
                        warn!(error = %e, "Chat text search failed");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not read screen size");
                None
            }
        };
        if let Err(e) = self.actuator.press_key("esc").await {
            warn!(error = %e, "Could not close chat");
        }
        if let Some(position) = found {
            warn!(%position, pattern = %self.settings.gold_pattern, "Gold text found in chat");
            return true;
        }
        false
    }

    fn report_status(&self, elapsed: Duration, timeout: Duration) {
        let remaining = timeout.saturating_sub(elapsed);
        let mut detail = OperationDetail::new();
        detail.insert("elapsed_secs".into(), json!(elapsed.as_secs()));
        detail.insert("remaining_secs".into(), json!(remaining.as_secs()));
        if let Some(infinite) = &self.infinite {
            let snapshot = infinite.automaton.snapshot();
            info!(
                elapsed_secs = elapsed.as_secs(),
                remaining_secs = remaining.as_secs(),
                cycles = snapshot.counters.total_cycles,
                attempts = snapshot.attempts,
                hero_dead = snapshot.state.incapacitated,
                "Lobby status"
            );
        } else {
            info!(
                elapsed_secs = elapsed.as_secs(),
                remaining_secs = remaining.as_secs(),
                "Lobby status"
            );
        }
        self.control.update_operation_details(detail);
    }
}

#[async_trait]
impl SessionRunner for LobbyMonitorLoop {
    async fn run_session(&self) -> RunLoopResult<SessionOutcome> {
        if self.settings.wait_for_accept {
            if let Some(outcome) = self.await_accept().await {
                return Ok(outcome);
            }
        }
        Ok(self.monitor().await)
    }
}

#[cfg(test)]
#[path = "lobby_tests.rs"]
mod tests;

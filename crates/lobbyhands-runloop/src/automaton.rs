//! Infinite-mode cycle automaton.
//!
//! Alternates entry and exit attempts, counts completed cycles in the
//! persistent [`CounterStore`] and infers the hero's death from a run of
//! "button still present" signals on entry attempts.
//!
//! One [`CycleAutomaton::perform_cycle`] call is one step. Every step works
//! on a copy of the session state and commits it only when the step ends
//! without a collaborator error, so a failed click or screen read never
//! leaves a half-applied transition behind.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use lobbyhands_config::InfiniteConfig;
use lobbyhands_control::OperationDetail;
use lobbyhands_protocols::{Actuator, CollaboratorError, Position, Vision};
use lobbyhands_store::{CounterStore, CycleCounters, StatEventKind, StatsJournal};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

/// Consecutive "button present" entry signals that mean the hero is dead.
pub const DEATH_SIGNAL_THRESHOLD: u32 = 6;

/// Kind of the last successful action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    None,
    Enter,
    Exit,
}

impl ActionKind {
    /// Kind of the next attempt. Strictly alternates, starting with entry.
    pub fn next_attempt(self) -> ActionKind {
        match self {
            ActionKind::None | ActionKind::Exit => ActionKind::Enter,
            ActionKind::Enter => ActionKind::Exit,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::None => write!(f, "none"),
            ActionKind::Enter => write!(f, "enter"),
            ActionKind::Exit => write!(f, "exit"),
        }
    }
}

/// Session-scoped automaton state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutomatonState {
    pub last_action_kind: ActionKind,
    pub consecutive_entry_signals: u32,
    pub incapacitated: bool,
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    EntrySuccess,
    ExitSuccess,
    ButtonNotFound,
    /// The death threshold was reached on this step.
    HeroDead,
    /// Still waiting for the next round; nothing was actuated.
    HeroDeadSkip,
    /// A collaborator failed; state is unchanged.
    Error(String),
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::EntrySuccess | CycleOutcome::ExitSuccess)
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::EntrySuccess => write!(f, "ENTRY_SUCCESS"),
            CycleOutcome::ExitSuccess => write!(f, "EXIT_SUCCESS"),
            CycleOutcome::ButtonNotFound => write!(f, "BUTTON_NOT_FOUND"),
            CycleOutcome::HeroDead => write!(f, "HERO_DEAD"),
            CycleOutcome::HeroDeadSkip => write!(f, "HERO_DEAD_SKIP"),
            CycleOutcome::Error(msg) => write!(f, "ERROR: {}", msg),
        }
    }
}

/// Status view of the automaton.
#[derive(Debug, Clone, Serialize)]
pub struct AutomatonSnapshot {
    pub state: AutomatonState,
    pub attempts: u64,
    pub session_successes: u64,
    pub counters: CycleCounters,
}

#[derive(Debug, Default)]
struct Session {
    state: AutomatonState,
    attempts: u64,
    successes: u64,
    /// Bumped by `reset_session`; a step started under an older epoch
    /// does not write its state back.
    epoch: u64,
}

/// Counter change decided by a step, applied after the state commit.
enum CounterChange {
    None,
    Entry,
    Exit,
    Incapacitation,
}

/// The enter/exit state machine.
pub struct CycleAutomaton {
    settings: InfiniteConfig,
    vision: Arc<dyn Vision>,
    actuator: Arc<dyn Actuator>,
    counters: Arc<CounterStore>,
    stats: Option<Arc<StatsJournal>>,
    session: Mutex<Session>,
}

impl CycleAutomaton {
    pub fn new(
        settings: InfiniteConfig,
        vision: Arc<dyn Vision>,
        actuator: Arc<dyn Actuator>,
        counters: Arc<CounterStore>,
    ) -> Self {
        Self {
            settings,
            vision,
            actuator,
            counters,
            stats: None,
            session: Mutex::new(Session::default()),
        }
    }

    /// Record hero deaths in a statistics journal.
    pub fn with_stats(mut self, stats: Arc<StatsJournal>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn settings(&self) -> &InfiniteConfig {
        &self.settings
    }

    pub fn counters(&self) -> &Arc<CounterStore> {
        &self.counters
    }

    pub fn state(&self) -> AutomatonState {
        self.session.lock().state.clone()
    }

    pub fn snapshot(&self) -> AutomatonSnapshot {
        let session = self.session.lock();
        AutomatonSnapshot {
            state: session.state.clone(),
            attempts: session.attempts,
            session_successes: session.successes,
            counters: self.counters.snapshot(),
        }
    }

    /// Reset the session state and counters. Durable counters are untouched.
    pub fn reset_session(&self) {
        let mut session = self.session.lock();
        session.state = AutomatonState::default();
        session.attempts = 0;
        session.successes = 0;
        session.epoch += 1;
        info!("Infinite mode session state reset");
    }

    /// Detail entries for the current operation record.
    pub fn operation_details(&self) -> OperationDetail {
        let snapshot = self.snapshot();
        let value = json!({
            "infinite_attempts": snapshot.attempts,
            "infinite_entries": snapshot.counters.total_entries,
            "infinite_exits": snapshot.counters.total_exits,
            "infinite_cycles": snapshot.counters.total_cycles,
            "hero_dead": snapshot.state.incapacitated,
            "hero_death_count": snapshot.counters.incapacitation_count,
        });
        match value {
            serde_json::Value::Object(map) => map,
            _ => OperationDetail::new(),
        }
    }

    /// Run one step. Never fails: collaborator errors become
    /// [`CycleOutcome::Error`] and leave the state as it was.
    pub async fn perform_cycle(&self) -> CycleOutcome {
        let (mut state, epoch, attempt) = {
            let mut session = self.session.lock();
            session.attempts += 1;
            (session.state.clone(), session.epoch, session.attempts)
        };

        debug!(
            attempt,
            last_action = %state.last_action_kind,
            "Starting infinite cycle"
        );

        let (outcome, change) = match self.step(&mut state, attempt).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    attempt,
                    action = %state.last_action_kind.next_attempt(),
                    error = %e,
                    "Infinite cycle failed"
                );
                return CycleOutcome::Error(e.to_string());
            }
        };

        {
            let mut session = self.session.lock();
            if session.epoch == epoch {
                session.state = state;
                if outcome.is_success() {
                    session.successes += 1;
                }
            } else {
                debug!(attempt, "Session reset during cycle, discarding step state");
            }
        }

        self.apply_counters(change, attempt).await;
        outcome
    }

    async fn step(
        &self,
        state: &mut AutomatonState,
        attempt: u64,
    ) -> Result<(CycleOutcome, CounterChange), CollaboratorError> {
        if state.incapacitated {
            if self.vision.find_action_button().await?.is_some() {
                debug!(attempt, "Hero still dead, skipping attempt");
                return Ok((CycleOutcome::HeroDeadSkip, CounterChange::None));
            }
            info!(attempt, "Action button gone, new round started");
            state.incapacitated = false;
            state.consecutive_entry_signals = 0;
        }

        let kind = state.last_action_kind.next_attempt();
        let target = Position::new(self.settings.click_x, self.settings.click_y);

        self.actuator.press_key(&self.settings.camera_key).await?;
        self.actuator.move_and_click(target.x, target.y, 1).await?;

        let Some(button) = self.vision.find_action_button().await? else {
            info!(attempt, action = %kind, "Action button not found after click");
            state.consecutive_entry_signals = 0;
            return Ok((CycleOutcome::ButtonNotFound, CounterChange::None));
        };

        if kind == ActionKind::Enter {
            state.consecutive_entry_signals += 1;
            if state.consecutive_entry_signals >= DEATH_SIGNAL_THRESHOLD {
                warn!(
                    attempt,
                    signals = state.consecutive_entry_signals,
                    "Entry button keeps reappearing, hero is dead"
                );
                state.incapacitated = true;
                return Ok((CycleOutcome::HeroDead, CounterChange::Incapacitation));
            }
        }

        if button.is_far_from(target, self.settings.reposition_tolerance_px) {
            debug!(attempt, %button, "Clicking button at its found position");
            self.actuator.move_and_click(button.x, button.y, 1).await?;
        }

        state.consecutive_entry_signals = 0;
        match kind {
            ActionKind::Enter => {
                tokio::time::sleep(self.settings.confirm_delay()).await;
                self.actuator.press_key(&self.settings.confirm_key).await?;
                state.last_action_kind = ActionKind::Enter;
                info!(attempt, "Infinite mode entered");
                Ok((CycleOutcome::EntrySuccess, CounterChange::Entry))
            }
            _ => {
                state.last_action_kind = ActionKind::Exit;
                info!(attempt, "Infinite mode exited");
                Ok((CycleOutcome::ExitSuccess, CounterChange::Exit))
            }
        }
    }

    /// Persist the counter change. On failure the previous counters stay
    /// current and the step's outcome is kept.
    async fn apply_counters(&self, change: CounterChange, attempt: u64) {
        let current = self.counters.snapshot();
        let now = Utc::now();
        let next = match change {
            CounterChange::None => return,
            CounterChange::Entry => current.with_entry(now),
            CounterChange::Exit => current.with_exit(now),
            CounterChange::Incapacitation => current.with_incapacitation(),
        };

        if let Err(e) = self.counters.commit(next).await {
            error!(attempt, error = %e, "Failed to persist cycle counters");
            return;
        }

        let counters = self.counters.snapshot();
        match change {
            CounterChange::Exit => info!(
                attempt,
                cycles = counters.total_cycles,
                entries = counters.total_entries,
                exits = counters.total_exits,
                "Cycle completed"
            ),
            CounterChange::Incapacitation => {
                if let Some(stats) = &self.stats {
                    stats
                        .record(StatEventKind::HeroDeathInfinite {
                            details: format!(
                                "{} consecutive entry signals, {} deaths total",
                                DEATH_SIGNAL_THRESHOLD, counters.incapacitation_count
                            ),
                        })
                        .await;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "automaton_tests.rs"]
mod tests;

//! # LobbyHands RunLoop
//!
//! The polling loop that keeps a lobby alive and cycles infinite mode.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Supervisor                           │
//! │   session → Restart(reason) → delay → session → ... Shutdown │
//! └─────────────────────────────┬────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼────────────────────────────────┐
//! │                      LobbyMonitorLoop                        │
//! │  every tick:  checkpoint + active-time timeout               │
//! │  every 10s:   CycleAutomaton ── cycles ──► TriggerEngine     │
//! │  every 5s:    death frame check                              │
//! │  every N:     gold text in chat                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All waiting is cooperative: the loop polls the shared
//! [`PauseController`](lobbyhands_control::PauseController) and never
//! interrupts an actuation half-way.
//!
//! ## Key Components
//!
//! - [`CycleAutomaton`]: enter/exit alternation and hero death inference
//! - [`TriggerEngine`]: one-shot triggers keyed on completed cycles
//! - [`LobbyMonitorLoop`]: one lobby session
//! - [`Supervisor`]: back-to-back sessions with restart bookkeeping

pub mod automaton;
pub mod engine;
pub mod error;
pub mod lobby;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testing;

pub use automaton::{
    ActionKind, AutomatonSnapshot, AutomatonState, CycleAutomaton, CycleOutcome,
    DEATH_SIGNAL_THRESHOLD,
};
pub use engine::{DueTrigger, FireReport, TriggerEngine};
pub use error::{RunLoopError, RunLoopResult};
pub use lobby::{
    LobbyMonitorLoop, SessionOutcome, SessionRunner, ACCEPT_OPERATION, LOBBY_OPERATION,
};
pub use supervisor::{Supervisor, SupervisorExit, SupervisorReport};

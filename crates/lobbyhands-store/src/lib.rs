//! # LobbyHands Store
//!
//! Durable state that survives process restarts.
//!
//! ## Files
//!
//! ```text
//! {data_dir}/
//! ├── counters.json    # cycle counters, rewritten after every step
//! ├── triggers.json    # entities and their cycle triggers
//! └── statistics.json  # totals and recent events
//! ```
//!
//! Every write goes to a temporary sibling and is renamed over the target,
//! so concurrent readers see either the old or the new document.

pub mod atomic;
pub mod counters;
pub mod error;
pub mod stats;
pub mod triggers;

pub use counters::{CounterStore, CycleCounters};
pub use error::StoreError;
pub use stats::{HostDeathCause, StatEvent, StatEventKind, StatsJournal, StatsSnapshot, MAX_EVENTS};
pub use triggers::{
    ClickStep, Entity, TriggerBook, TriggerBookStore, TriggerRule, DEFAULT_CLICK_DELAY_SECS,
};

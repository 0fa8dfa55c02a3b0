//! Statistics journal.
//!
//! Recording is best-effort: write failures are logged and the in-memory
//! journal keeps going.

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::atomic;
use crate::error::StoreError;

/// Events kept in the journal, oldest dropped first.
pub const MAX_EVENTS: usize = 200;

/// How the host's death was noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostDeathCause {
    DeathFrame,
    GoldText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatEventKind {
    SessionStart,
    HostDeath {
        cause: HostDeathCause,
        details: String,
    },
    HeroDeathInfinite {
        details: String,
    },
    TriggerFired {
        entity: String,
        threshold: u64,
        current_cycles: u64,
    },
    Restart {
        reason: String,
    },
}

impl StatEventKind {
    /// Key under which the event is totalled.
    pub fn total_key(&self) -> &'static str {
        match self {
            StatEventKind::SessionStart => "sessions",
            StatEventKind::HostDeath { .. } => "host_deaths",
            StatEventKind::HeroDeathInfinite { .. } => "hero_deaths_infinite",
            StatEventKind::TriggerFired { .. } => "triggers_fired",
            StatEventKind::Restart { .. } => "restarts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEvent {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: StatEventKind,
}

/// On-disk journal document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub totals: BTreeMap<String, u64>,
    pub events: VecDeque<StatEvent>,
    pub session_started_at: Option<DateTime<Utc>>,
}

impl StatsSnapshot {
    pub fn total(&self, key: &str) -> u64 {
        self.totals.get(key).copied().unwrap_or(0)
    }

    fn apply(&mut self, event: StatEvent) {
        *self
            .totals
            .entry(event.kind.total_key().to_string())
            .or_insert(0) += 1;
        if matches!(event.kind, StatEventKind::SessionStart) {
            self.session_started_at = Some(event.at);
        }
        self.events.push_back(event);
        while self.events.len() > MAX_EVENTS {
            self.events.pop_front();
        }
    }
}

/// File-backed journal of notable events.
pub struct StatsJournal {
    path: PathBuf,
    state: Mutex<StatsSnapshot>,
}

impl StatsJournal {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = atomic::read_json::<StatsSnapshot>(&path)
            .await?
            .unwrap_or_default();
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Append an event and persist.
    pub async fn record(&self, kind: StatEventKind) {
        let event = StatEvent {
            at: Utc::now(),
            kind,
        };
        let snapshot = {
            let mut state = self.state.lock();
            state.apply(event);
            state.clone()
        };
        if let Err(e) = atomic::write_json(&self.path, &snapshot).await {
            warn!("Failed to persist statistics to {:?}: {}", self.path, e);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.state.lock().clone()
    }

    /// Most recent events, newest last.
    pub fn recent(&self, limit: usize) -> Vec<StatEvent> {
        let state = self.state.lock();
        let skip = state.events.len().saturating_sub(limit);
        state.events.iter().skip(skip).cloned().collect()
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let empty = StatsSnapshot::default();
        atomic::write_json(&self.path, &empty).await?;
        *self.state.lock() = empty;
        info!("Statistics cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;

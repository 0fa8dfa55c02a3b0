//! Persistent cycle counters.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::atomic;
use crate::error::StoreError;

/// Durable enter/exit progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleCounters {
    pub total_entries: u64,
    pub total_exits: u64,
    pub total_cycles: u64,
    pub incapacitation_count: u64,
    pub last_entry_at: Option<DateTime<Utc>>,
    pub last_exit_at: Option<DateTime<Utc>>,
}

impl CycleCounters {
    /// Counters after one more entry.
    pub fn with_entry(&self, at: DateTime<Utc>) -> Self {
        Self {
            total_entries: self.total_entries + 1,
            last_entry_at: Some(at),
            ..self.clone()
        }
    }

    /// Counters after one more exit. A cycle completes on exit when a
    /// matching entry exists.
    pub fn with_exit(&self, at: DateTime<Utc>) -> Self {
        let mut next = Self {
            total_exits: self.total_exits + 1,
            last_exit_at: Some(at),
            ..self.clone()
        };
        if next.total_entries >= next.total_exits {
            next.total_cycles = next.total_exits;
        }
        next
    }

    pub fn with_incapacitation(&self) -> Self {
        Self {
            incapacitation_count: self.incapacitation_count + 1,
            ..self.clone()
        }
    }
}

/// File-backed counters with an in-memory copy.
///
/// The file is written first; the in-memory copy only changes once the write
/// has landed.
pub struct CounterStore {
    path: PathBuf,
    current: RwLock<CycleCounters>,
}

impl CounterStore {
    /// Load counters from `path`. Missing or malformed files yield zeros.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let current = atomic::read_json::<CycleCounters>(&path)
            .await?
            .unwrap_or_default();
        debug!(
            "Counters loaded from {:?}: {} cycles",
            path, current.total_cycles
        );
        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> CycleCounters {
        self.current.read().clone()
    }

    pub fn total_cycles(&self) -> u64 {
        self.current.read().total_cycles
    }

    /// Persist `next`, then make it current. On error nothing changes.
    pub async fn commit(&self, next: CycleCounters) -> Result<(), StoreError> {
        atomic::write_json(&self.path, &next).await?;
        *self.current.write() = next;
        Ok(())
    }

    /// Replace the counters with zeros.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.commit(CycleCounters::default()).await?;
        info!("Cycle counters cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "counters_tests.rs"]
mod tests;

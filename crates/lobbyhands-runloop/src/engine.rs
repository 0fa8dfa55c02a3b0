//! One-shot cycle triggers.
//!
//! The engine owns the in-memory [`TriggerBook`] and its file. A trigger is
//! due while enabled and the cycle count has reached its threshold. Firing
//! runs the entity's click sequence and, only on success, disables the
//! trigger. The enabled flag is the single guard against firing twice: it
//! flips in memory before the write, so a failed write can only cause a
//! repeat after the process restarts.

use std::sync::Arc;
use std::time::Duration;

use lobbyhands_protocols::{Actuator, CollaboratorError};
use lobbyhands_store::{
    ClickStep, StoreError, TriggerBook, TriggerBookStore, DEFAULT_CLICK_DELAY_SECS,
};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::RunLoopResult;

/// A trigger whose threshold has been reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueTrigger {
    pub entity_id: String,
    pub entity_name: String,
    pub threshold_cycles: u64,
}

/// Result of [`TriggerEngine::fire`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FireReport {
    pub success: bool,
    pub message: String,
    /// Whether the disabled flag was written and read back.
    pub persisted: bool,
}

impl FireReport {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            persisted: false,
        }
    }
}

/// Trigger evaluation, firing and operator edits.
pub struct TriggerEngine {
    store: TriggerBookStore,
    book: RwLock<TriggerBook>,
    actuator: Arc<dyn Actuator>,
    /// Serializes read-modify-write of the book file.
    write_lock: Mutex<()>,
}

impl TriggerEngine {
    /// Load the book from `store`.
    pub async fn open(store: TriggerBookStore, actuator: Arc<dyn Actuator>) -> RunLoopResult<Self> {
        let book = store.load().await?;
        info!(
            "Trigger engine loaded {} entities from {:?}",
            book.len(),
            store.path()
        );
        Ok(Self {
            store,
            book: RwLock::new(book),
            actuator,
            write_lock: Mutex::new(()),
        })
    }

    /// Current book.
    pub fn book(&self) -> TriggerBook {
        self.book.read().clone()
    }

    /// Triggers due at `current_cycles`, lowest threshold first.
    pub fn evaluate(&self, current_cycles: u64) -> Vec<DueTrigger> {
        let book = self.book.read();
        let mut due: Vec<DueTrigger> = book
            .entities()
            .flat_map(|(id, entity)| {
                entity
                    .triggers
                    .iter()
                    .filter(|t| t.enabled && current_cycles >= t.threshold_cycles)
                    .map(|t| DueTrigger {
                        entity_id: id.clone(),
                        entity_name: entity.name.clone(),
                        threshold_cycles: t.threshold_cycles,
                    })
            })
            .collect();
        due.sort_by(|a, b| {
            a.threshold_cycles
                .cmp(&b.threshold_cycles)
                .then_with(|| a.entity_id.cmp(&b.entity_id))
        });
        due
    }

    /// Run the entity's clicks, then disable the trigger.
    ///
    /// Never fails: problems are reported in the returned [`FireReport`].
    pub async fn fire(&self, entity_id: &str, threshold: u64, current_cycles: u64) -> FireReport {
        let (clicks, delay) = {
            let book = self.book.read();
            let Some(entity) = book.get(entity_id) else {
                return FireReport::failed(format!("Entity '{}' not found", entity_id));
            };
            match entity.trigger(threshold) {
                None => {
                    return FireReport::failed(format!(
                        "Entity '{}' has no trigger at {} cycles",
                        entity_id, threshold
                    ));
                }
                Some(t) if !t.enabled => {
                    return FireReport::failed(format!(
                        "Trigger {}@{} is disabled",
                        entity_id, threshold
                    ));
                }
                Some(_) => {}
            }
            if entity.clicks.is_empty() {
                return FireReport::failed(format!("Entity '{}' has no clicks", entity_id));
            }
            let delay = Duration::try_from_secs_f64(entity.click_delay_secs)
                .unwrap_or(Duration::from_secs_f64(DEFAULT_CLICK_DELAY_SECS));
            (entity.clicks.clone(), delay)
        };

        info!(
            entity = entity_id,
            threshold,
            current_cycles,
            clicks = clicks.len(),
            "Firing trigger"
        );

        if let Err(e) = self.run_clicks(&clicks, delay).await {
            warn!(entity = entity_id, threshold, error = %e, "Trigger actuation failed");
            return FireReport::failed(format!("Actuation failed: {}", e));
        }

        let persisted = self.disable_after_fire(entity_id, threshold).await;
        FireReport {
            success: true,
            message: format!(
                "Fired {}@{} at {} cycles ({} clicks)",
                entity_id,
                threshold,
                current_cycles,
                clicks.len()
            ),
            persisted,
        }
    }

    async fn run_clicks(
        &self,
        clicks: &[ClickStep],
        delay: Duration,
    ) -> Result<(), CollaboratorError> {
        for (i, click) in clicks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(delay).await;
            }
            debug!(step = i + 1, x = click.x, y = click.y, "{}", click.description);
            self.actuator.move_and_click(click.x, click.y, 1).await?;
        }
        Ok(())
    }

    /// Flip the flag in memory, write, then read the file back to confirm.
    async fn disable_after_fire(&self, entity_id: &str, threshold: u64) -> bool {
        let _guard = self.write_lock.lock().await;

        let next = {
            let mut book = self.book.write();
            if let Err(e) = book.set_trigger_enabled(entity_id, threshold, false) {
                warn!(entity = entity_id, threshold, error = %e, "Trigger vanished while firing");
                return false;
            }
            book.clone()
        };

        if let Err(e) = self.store.save(&next).await {
            error!(
                entity = entity_id,
                threshold,
                error = %e,
                "Failed to persist fired trigger; it may fire again after a restart"
            );
            return false;
        }

        match self.store.load().await {
            Ok(reloaded) => {
                let confirmed = reloaded
                    .get(entity_id)
                    .and_then(|e| e.trigger(threshold))
                    .is_some_and(|t| !t.enabled);
                if !confirmed {
                    error!(entity = entity_id, threshold, "Fired trigger still enabled on disk");
                }
                confirmed
            }
            Err(e) => {
                error!(entity = entity_id, threshold, error = %e, "Failed to re-read trigger book");
                false
            }
        }
    }

    /// Reload the book from disk, discarding the in-memory copy.
    pub async fn reload(&self) -> RunLoopResult<()> {
        let _guard = self.write_lock.lock().await;
        let book = self.store.load().await?;
        *self.book.write() = book;
        Ok(())
    }

    /// Apply `edit` to a copy, persist it, then make it current.
    async fn update<R>(
        &self,
        edit: impl FnOnce(&mut TriggerBook) -> Result<R, StoreError>,
    ) -> RunLoopResult<R> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.book.read().clone();
        let result = edit(&mut next)?;
        self.store.save(&next).await?;
        *self.book.write() = next;
        Ok(result)
    }

    pub async fn add_entity(&self, id: &str, name: &str) -> RunLoopResult<()> {
        self.update(|book| book.add_entity(id, name)).await?;
        info!(entity = id, "Entity added");
        Ok(())
    }

    pub async fn remove_entity(&self, id: &str) -> RunLoopResult<()> {
        self.update(|book| book.remove_entity(id)).await?;
        info!(entity = id, "Entity removed");
        Ok(())
    }

    pub async fn set_click_delay(&self, id: &str, delay_secs: f64) -> RunLoopResult<()> {
        self.update(|book| book.set_click_delay(id, delay_secs)).await
    }

    pub async fn set_clicks(&self, id: &str, clicks: Vec<ClickStep>) -> RunLoopResult<()> {
        self.update(|book| book.set_clicks(id, clicks)).await
    }

    pub async fn add_trigger(&self, id: &str, threshold: u64) -> RunLoopResult<()> {
        self.update(|book| book.add_trigger(id, threshold)).await?;
        info!(entity = id, threshold, "Trigger added");
        Ok(())
    }

    pub async fn remove_trigger(&self, id: &str, threshold: u64) -> RunLoopResult<()> {
        self.update(|book| book.remove_trigger(id, threshold)).await
    }

    /// Enable or disable a trigger. Re-enabling lets a fired trigger fire again.
    pub async fn set_trigger_enabled(
        &self,
        id: &str,
        threshold: u64,
        enabled: bool,
    ) -> RunLoopResult<()> {
        let previous = self
            .update(|book| book.set_trigger_enabled(id, threshold, enabled))
            .await?;
        if previous != enabled {
            info!(entity = id, threshold, enabled, "Trigger toggled");
        }
        Ok(())
    }

    /// One line per trigger, sorted by entity then threshold.
    pub fn list(&self) -> Vec<String> {
        let book = self.book.read();
        let mut lines = Vec::new();
        for (id, entity) in book.entities() {
            if entity.triggers.is_empty() {
                lines.push(format!("{} ({}): no triggers", id, entity.name));
            }
            for t in &entity.triggers {
                lines.push(format!(
                    "{} ({}) @ {} cycles: {}",
                    id,
                    entity.name,
                    t.threshold_cycles,
                    if t.enabled { "enabled" } else { "disabled" }
                ));
            }
        }
        lines
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

//! Entities and their one-shot cycle triggers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atomic;
use crate::error::StoreError;

pub const DEFAULT_CLICK_DELAY_SECS: f64 = 2.0;
const CLICK_DELAY_RANGE: std::ops::RangeInclusive<f64> = 0.1..=10.0;

fn default_click_delay() -> f64 {
    DEFAULT_CLICK_DELAY_SECS
}

fn default_enabled() -> bool {
    true
}

/// One positioned click of an entity's actuation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickStep {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub description: String,
}

/// Fires once `total_cycles >= threshold_cycles` while enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub threshold_cycles: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A managed entity: a name, an ordered click sequence and its triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default = "default_click_delay")]
    pub click_delay_secs: f64,
    #[serde(default)]
    pub clicks: Vec<ClickStep>,
    /// Sorted by threshold, unique per threshold.
    #[serde(default)]
    pub triggers: Vec<TriggerRule>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            click_delay_secs: DEFAULT_CLICK_DELAY_SECS,
            clicks: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn trigger(&self, threshold: u64) -> Option<&TriggerRule> {
        self.triggers
            .iter()
            .find(|t| t.threshold_cycles == threshold)
    }

    fn trigger_mut(&mut self, threshold: u64) -> Option<&mut TriggerRule> {
        self.triggers
            .iter_mut()
            .find(|t| t.threshold_cycles == threshold)
    }
}

/// All entities keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerBook {
    entities: BTreeMap<String, Entity>,
}

impl TriggerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Entity, StoreError> {
        self.entities
            .get_mut(id)
            .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))
    }

    pub fn entities(&self) -> impl Iterator<Item = (&String, &Entity)> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn add_entity(&mut self, id: &str, name: &str) -> Result<(), StoreError> {
        if self.entities.contains_key(id) {
            return Err(StoreError::EntityExists(id.to_string()));
        }
        self.entities.insert(id.to_string(), Entity::new(name));
        Ok(())
    }

    pub fn remove_entity(&mut self, id: &str) -> Result<Entity, StoreError> {
        self.entities
            .remove(id)
            .ok_or_else(|| StoreError::EntityNotFound(id.to_string()))
    }

    pub fn set_click_delay(&mut self, id: &str, delay_secs: f64) -> Result<(), StoreError> {
        if !CLICK_DELAY_RANGE.contains(&delay_secs) {
            return Err(StoreError::InvalidDelay(delay_secs));
        }
        self.get_mut(id)?.click_delay_secs = delay_secs;
        Ok(())
    }

    pub fn set_clicks(&mut self, id: &str, clicks: Vec<ClickStep>) -> Result<(), StoreError> {
        self.get_mut(id)?.clicks = clicks;
        Ok(())
    }

    /// Add an enabled trigger, keeping the list sorted by threshold.
    pub fn add_trigger(&mut self, id: &str, threshold: u64) -> Result<(), StoreError> {
        if threshold == 0 {
            return Err(StoreError::InvalidThreshold);
        }
        let entity = self.get_mut(id)?;
        if entity.trigger(threshold).is_some() {
            return Err(StoreError::TriggerExists {
                entity: id.to_string(),
                threshold,
            });
        }
        entity.triggers.push(TriggerRule {
            threshold_cycles: threshold,
            enabled: true,
        });
        entity.triggers.sort_by_key(|t| t.threshold_cycles);
        Ok(())
    }

    pub fn remove_trigger(&mut self, id: &str, threshold: u64) -> Result<(), StoreError> {
        let entity = self.get_mut(id)?;
        let before = entity.triggers.len();
        entity.triggers.retain(|t| t.threshold_cycles != threshold);
        if entity.triggers.len() == before {
            return Err(StoreError::TriggerNotFound {
                entity: id.to_string(),
                threshold,
            });
        }
        Ok(())
    }

    /// Set a trigger's enabled flag. Returns the previous value.
    pub fn set_trigger_enabled(
        &mut self,
        id: &str,
        threshold: u64,
        enabled: bool,
    ) -> Result<bool, StoreError> {
        let trigger = self
            .get_mut(id)?
            .trigger_mut(threshold)
            .ok_or_else(|| StoreError::TriggerNotFound {
                entity: id.to_string(),
                threshold,
            })?;
        Ok(std::mem::replace(&mut trigger.enabled, enabled))
    }
}

/// File holding the [`TriggerBook`].
pub struct TriggerBookStore {
    path: PathBuf,
}

impl TriggerBookStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or malformed files yield an empty book.
    pub async fn load(&self) -> Result<TriggerBook, StoreError> {
        let book = atomic::read_json::<TriggerBook>(&self.path)
            .await?
            .unwrap_or_default();
        debug!("Trigger book loaded: {} entities", book.len());
        Ok(book)
    }

    pub async fn save(&self, book: &TriggerBook) -> Result<(), StoreError> {
        atomic::write_json(&self.path, book).await
    }
}

#[cfg(test)]
#[path = "triggers_tests.rs"]
mod tests;

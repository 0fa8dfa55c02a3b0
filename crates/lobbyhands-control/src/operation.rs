//! Operation records and their bounded history.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

/// Free-form detail attached to an operation.
pub type OperationDetail = serde_json::Map<String, serde_json::Value>;

/// A named phase of work.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRecord {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub detail: OperationDetail,
    /// Set when the record is archived.
    pub duration_secs: Option<f64>,
    #[serde(skip)]
    started: Instant,
}

impl OperationRecord {
    pub fn new(name: impl Into<String>, detail: OperationDetail) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            detail,
            duration_secs: None,
            started: Instant::now(),
        }
    }

    /// Time since the operation started.
    pub fn running_for(&self) -> Duration {
        Instant::now().saturating_duration_since(self.started)
    }

    fn close(mut self) -> Self {
        self.duration_secs = Some(self.running_for().as_secs_f64());
        self
    }
}

/// The current operation plus archived ones, oldest evicted first.
#[derive(Debug)]
pub(crate) struct OperationLog {
    current: Option<OperationRecord>,
    history: VecDeque<OperationRecord>,
    capacity: usize,
}

impl OperationLog {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            current: None,
            history: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Archive the current record and install `next`.
    pub(crate) fn start(&mut self, next: OperationRecord) {
        if let Some(previous) = self.current.take() {
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(previous.close());
        }
        self.current = Some(next);
    }

    pub(crate) fn merge_detail(&mut self, detail: OperationDetail) {
        if let Some(current) = self.current.as_mut() {
            current.detail.extend(detail);
        }
    }

    pub(crate) fn current(&self) -> Option<&OperationRecord> {
        self.current.as_ref()
    }

    /// Most recent archived records, newest last.
    pub(crate) fn recent(&self, limit: usize) -> Vec<OperationRecord> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(key: &str, value: serde_json::Value) -> OperationDetail {
        let mut map = OperationDetail::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn test_start_archives_previous() {
        let mut log = OperationLog::new(3);
        log.start(OperationRecord::new("a", OperationDetail::new()));
        log.start(OperationRecord::new("b", OperationDetail::new()));

        assert_eq!(log.current().map(|r| r.name.as_str()), Some("b"));
        let history = log.recent(10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "a");
        assert!(history[0].duration_secs.is_some());
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut log = OperationLog::new(2);
        for name in ["a", "b", "c", "d"] {
            log.start(OperationRecord::new(name, OperationDetail::new()));
        }
        let names: Vec<_> = log.recent(10).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_recent_limit() {
        let mut log = OperationLog::new(10);
        for name in ["a", "b", "c", "d"] {
            log.start(OperationRecord::new(name, OperationDetail::new()));
        }
        let names: Vec<_> = log.recent(2).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_merge_detail() {
        let mut log = OperationLog::new(2);
        log.start(OperationRecord::new("a", detail("phase", json!("start"))));
        log.merge_detail(detail("phase", json!("monitor")));
        log.merge_detail(detail("cycles", json!(4)));

        let current = log.current().unwrap();
        assert_eq!(current.detail["phase"], json!("monitor"));
        assert_eq!(current.detail["cycles"], json!(4));
    }

    #[test]
    fn test_merge_detail_without_current() {
        let mut log = OperationLog::new(2);
        log.merge_detail(detail("x", json!(1)));
        assert!(log.current().is_none());
    }
}

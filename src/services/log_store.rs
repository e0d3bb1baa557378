//! Bounded, newest-first operator log.

use crate::types::{LogEntry, LogLevel};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of retained entries.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Ring buffer of operator log entries, newest at index 0.
#[derive(Debug, Clone)]
pub struct LogStore {
    entries: Arc<VecDeque<LogEntry>>,
    capacity: usize,
}

impl LogStore {
    /// Create a new log store with a fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Prepend a new entry, evicting the oldest ones past capacity.
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>, details: Option<Value>) -> LogEntry {
        let entry = LogEntry::new(level, message, details);
        let entries = Arc::make_mut(&mut self.entries);
        entries.push_front(entry.clone());
        entries.truncate(self.capacity);
        entry
    }

    /// Shared view of the current entries.
    pub fn entries(&self) -> Arc<VecDeque<LogEntry>> {
        self.entries.clone()
    }

    /// Entries with the given level, newest first.
    pub fn by_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut store = LogStore::default();
        store.push(LogLevel::Info, "first", None);
        store.push(LogLevel::Success, "second", None);

        let entries = store.entries();
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let mut store = LogStore::default();
        for i in 0..DEFAULT_LOG_CAPACITY {
            store.push(LogLevel::Info, format!("entry {}", i), None);
        }
        assert_eq!(store.len(), DEFAULT_LOG_CAPACITY);

        store.push(LogLevel::Warning, "entry 100", None);

        let entries = store.entries();
        assert_eq!(entries.len(), DEFAULT_LOG_CAPACITY);
        assert_eq!(entries[0].message, "entry 100");
        assert!(entries.iter().all(|e| e.message != "entry 0"));
        assert_eq!(entries[DEFAULT_LOG_CAPACITY - 1].message, "entry 1");
    }

    #[test]
    fn test_previous_views_are_not_mutated() {
        let mut store = LogStore::new(2);
        store.push(LogLevel::Info, "a", None);
        let before = store.entries();

        store.push(LogLevel::Info, "b", None);
        store.push(LogLevel::Info, "c", None);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].message, "a");
        assert_eq!(store.len(), 2);
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn test_filter_by_level() {
        let mut store = LogStore::default();
        store.push(LogLevel::Info, "info", None);
        store.push(LogLevel::Error, "boom", Some(serde_json::json!({ "quantity": -1 })));
        store.push(LogLevel::Error, "boom again", None);

        let errors = store.by_level(LogLevel::Error);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "boom again");
        assert_eq!(errors[1].details, Some(serde_json::json!({ "quantity": -1 })));
    }
}

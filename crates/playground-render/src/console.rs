//! Console log aggregation
//!
//! Collects log lines from sandboxed frames and from host-side render
//! failures into one bounded, de-duplicated stream for the console panel.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Default retained entries
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Console severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl ConsoleLevel {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (possibly merged) console line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLogEntry {
    pub level: ConsoleLevel,
    pub message: String,
    /// Unix epoch milliseconds of the latest occurrence
    pub timestamp: i64,
    /// Consecutive identical occurrences, at least 1
    pub count: u32,
}

#[derive(Debug)]
struct ConsoleState {
    entries: VecDeque<ConsoleLogEntry>,
    max_entries: usize,
}

/// Bounded, merging console log
///
/// Cheap to clone; clones share the same log.
#[derive(Debug, Clone)]
pub struct ConsoleLogAggregator {
    state: Arc<Mutex<ConsoleState>>,
}

impl ConsoleLogAggregator {
    /// Create aggregator retaining at most `max_entries` lines
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConsoleState {
                entries: VecDeque::new(),
                max_entries: max_entries.max(1),
            })),
        }
    }

    /// Record a line now
    pub fn push(&self, level: ConsoleLevel, message: impl Into<String>) {
        self.push_at(level, message, chrono::Utc::now().timestamp_millis());
    }

    /// Record a line with an explicit timestamp
    ///
    /// A line identical in level and message to the newest entry merges into
    /// it: the count grows and the timestamp moves forward.
    pub fn push_at(&self, level: ConsoleLevel, message: impl Into<String>, timestamp: i64) {
        let message = message.into();
        let mut state = self.state.lock();

        if let Some(last) = state.entries.back_mut() {
            if last.level == level && last.message == message {
                last.count = last.count.saturating_add(1);
                last.timestamp = timestamp;
                return;
            }
        }

        tracing::debug!(%level, %message, "console");
        state.entries.push_back(ConsoleLogEntry {
            level,
            message,
            timestamp,
            count: 1,
        });
        while state.entries.len() > state.max_entries {
            state.entries.pop_front();
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Snapshot of all entries, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<ConsoleLogEntry> {
        self.state.lock().entries.iter().cloned().collect()
    }

    /// Number of (merged) entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the log is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Number of errors recorded, merged repeats included, for the toolbar badge
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| e.level == ConsoleLevel::Error)
            .map(|e| e.count as usize)
            .sum()
    }

    /// Retention limit
    #[inline]
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.state.lock().max_entries
    }
}

impl Default for ConsoleLogAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn consecutive_duplicates_merge() {
        let console = ConsoleLogAggregator::default();
        console.push_at(ConsoleLevel::Log, "tick", 1);
        console.push_at(ConsoleLevel::Log, "tick", 2);
        console.push_at(ConsoleLevel::Log, "tick", 3);

        let entries = console.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, 3);
        assert_eq!(entries[0].timestamp, 3);
    }

    #[test]
    fn level_change_breaks_the_run() {
        let console = ConsoleLogAggregator::default();
        console.push_at(ConsoleLevel::Log, "x", 1);
        console.push_at(ConsoleLevel::Warn, "x", 2);
        console.push_at(ConsoleLevel::Log, "x", 3);
        assert_eq!(console.len(), 3);
        assert!(console.entries().iter().all(|e| e.count == 1));
    }

    #[test]
    fn message_change_breaks_the_run() {
        let console = ConsoleLogAggregator::default();
        console.push_at(ConsoleLevel::Error, "x", 1);
        console.push_at(ConsoleLevel::Error, "y", 2);
        assert_eq!(console.len(), 2);

        console.push_at(ConsoleLevel::Warn, "y", 3);
        assert_eq!(console.len(), 3);
    }

    #[test]
    fn merged_errors_count_every_repeat() {
        let console = ConsoleLogAggregator::default();
        for t in 0..3 {
            console.push_at(ConsoleLevel::Error, "boom", t);
        }
        console.push_at(ConsoleLevel::Warn, "boom", 3);

        assert_eq!(console.len(), 2);
        assert_eq!(console.error_count(), 3);
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let console = ConsoleLogAggregator::new(3);
        for i in 0..5 {
            console.push_at(ConsoleLevel::Info, format!("line {i}"), i);
        }
        let messages: Vec<_> = console.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn error_count_and_clear() {
        let console = ConsoleLogAggregator::default();
        console.push(ConsoleLevel::Error, "a");
        console.push(ConsoleLevel::Log, "b");
        console.push(ConsoleLevel::Error, "c");
        assert_eq!(console.error_count(), 2);

        let shared = console.clone();
        shared.clear();
        assert!(console.is_empty());
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ConsoleLevel::Warn).unwrap(), "\"warn\"");
    }
}

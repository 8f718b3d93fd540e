//! History module - bounded, deduplicating per-signal buffers

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default retention cap per signal. Matches the device's history feed,
/// which serves the last 20 entries per signal.
pub const DEFAULT_CAPACITY: usize = 20;

// ============================================================================
// HISTORY ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<T> {
    pub value: T,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// HISTORY BUFFER
// ============================================================================

/// Append-only buffer with newest-first ordering, FIFO eviction at the
/// capacity cap, and dedup-on-write: an append whose value equals the
/// newest entry's value is dropped. Consecutive identical states thus
/// collapse into one entry, so e.g. each `Crying` entry in the sound
/// history is one crying episode.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    entries: VecDeque<HistoryEntry<T>>,
    capacity: usize,
}

impl<T: PartialEq + Clone> HistoryBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Append a value, unless it equals the newest entry's value.
    /// Returns true if an entry was actually written.
    pub fn append(&mut self, value: T, timestamp: DateTime<Utc>) -> bool {
        if let Some(newest) = self.entries.front() {
            if newest.value == value {
                return false;
            }
        }
        self.entries.push_front(HistoryEntry { value, timestamp });
        if self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
        true
    }

    /// Newest-first view of the buffer.
    pub fn snapshot(&self) -> Vec<HistoryEntry<T>> {
        self.entries.iter().cloned().collect()
    }

    pub fn newest(&self) -> Option<&HistoryEntry<T>> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: PartialEq + Clone> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn append_keeps_newest_first() {
        let mut buf = HistoryBuffer::new();
        buf.append(1.0, ts(10));
        buf.append(2.0, ts(20));
        let snap = buf.snapshot();
        assert_eq!(snap[0].value, 2.0);
        assert_eq!(snap[1].value, 1.0);
    }

    #[test]
    fn unchanged_value_is_not_appended() {
        let mut buf = HistoryBuffer::new();
        assert!(buf.append(36.5, ts(10)));
        assert!(!buf.append(36.5, ts(20)));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn value_change_and_return_both_recorded() {
        let mut buf = HistoryBuffer::new();
        buf.append("Quiet", ts(10));
        buf.append("Crying", ts(20));
        buf.append("Quiet", ts(30));
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn oldest_evicted_at_capacity() {
        let mut buf = HistoryBuffer::with_capacity(3);
        for i in 0..5 {
            buf.append(i, ts(i as i64));
        }
        let snap = buf.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].value, 4);
        assert_eq!(snap[2].value, 2);
    }
}

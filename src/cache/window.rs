//! Window Queue Module
//!
//! Tracks insertion order for oldest-first eviction.

use std::collections::VecDeque;

// == Window Queue ==
/// Insertion-ordered queue of `(key, seq)` slots.
///
/// Front = oldest insertion, back = newest. Overwrites and deletes leave
/// their old slot behind; a slot is live only while the cache entry for its
/// key still carries the same `seq`. Callers skip dead slots when popping and
/// call [`WindowQueue::compact`] when dead slots pile up.
#[derive(Debug, Default)]
pub(crate) struct WindowQueue {
    order: VecDeque<(String, u64)>,
    next_seq: u64,
}

impl WindowQueue {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Push ==
    /// Appends a slot for `key` and returns its sequence number.
    pub fn push(&mut self, key: &str) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.push_back((key.to_string(), seq));
        seq
    }

    // == Pop Oldest ==
    /// Removes and returns the oldest slot.
    pub fn pop_oldest(&mut self) -> Option<(String, u64)> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest slot without removing it.
    pub fn peek_oldest(&self) -> Option<(&str, u64)> {
        self.order.front().map(|(key, seq)| (key.as_str(), *seq))
    }

    // == Compact ==
    /// Drops every slot for which `is_live` returns false, keeping order.
    pub fn compact(&mut self, mut is_live: impl FnMut(&str, u64) -> bool) {
        self.order.retain(|(key, seq)| is_live(key, *seq));
    }

    // == Length ==
    /// Returns the number of slots, dead ones included.
    pub fn len(&self) -> usize {
        self.order.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_new() {
        let window = WindowQueue::new();
        assert_eq!(window.len(), 0);
        assert_eq!(window.peek_oldest(), None);
    }

    #[test]
    fn test_push_assigns_increasing_seq() {
        let mut window = WindowQueue::new();

        let a = window.push("a");
        let b = window.push("b");

        assert!(b > a);
        assert_eq!(window.peek_oldest(), Some(("a", a)));
    }

    #[test]
    fn test_pop_oldest_in_insertion_order() {
        let mut window = WindowQueue::new();

        window.push("a");
        window.push("b");
        window.push("c");

        assert_eq!(window.pop_oldest().map(|(k, _)| k), Some("a".to_string()));
        assert_eq!(window.pop_oldest().map(|(k, _)| k), Some("b".to_string()));
        assert_eq!(window.pop_oldest().map(|(k, _)| k), Some("c".to_string()));
        assert_eq!(window.pop_oldest(), None);
    }

    #[test]
    fn test_repush_keeps_old_slot_until_compacted() {
        let mut window = WindowQueue::new();

        window.push("a");
        window.push("b");
        let latest = window.push("a");
        assert_eq!(window.len(), 3);

        // Only the newest slot of "a" is live
        window.compact(|key, seq| key != "a" || seq == latest);

        assert_eq!(window.len(), 2);
        assert_eq!(window.pop_oldest().map(|(k, _)| k), Some("b".to_string()));
        assert_eq!(window.pop_oldest(), Some(("a".to_string(), latest)));
    }
}

//! Bounded FIFO of text received from remote peers.
//!
//! Network submissions only ever call [`InboundQueue::enqueue`]; the local
//! "accept" action is the only caller of [`InboundQueue::dequeue_oldest`].
//! The queue itself is not synchronised.  The host keeps it behind the same
//! mutex as the outbound snapshot so both invariants hold together.
//!
//! # Eviction
//!
//! When the queue is full, the oldest item is dropped before the new one is
//! appended.  The submitter is never told: their submission still succeeds,
//! and the eviction is logged as a warning.

use std::collections::VecDeque;
use std::fmt;

use tracing::warn;

use crate::domain::item::SyncItem;

/// Ordered, bounded queue of [`SyncItem`]s awaiting local acceptance.
#[derive(Debug)]
pub struct InboundQueue {
    items: VecDeque<SyncItem>,
    capacity: usize,
}

impl InboundQueue {
    /// Creates an empty queue that holds at most `capacity` items.
    ///
    /// A capacity of 0 is raised to 1 so that the most recent submission is
    /// always retained.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Appends `item` to the tail and returns the new length.
    ///
    /// Evicts the head first if the queue is at capacity.
    pub fn enqueue(&mut self, item: SyncItem) -> usize {
        if self.items.len() >= self.capacity {
            if let Some(evicted) = self.items.pop_front() {
                warn!(
                    "inbound queue full (capacity {}); evicted oldest item {}",
                    self.capacity, evicted.id
                );
            }
        }
        self.items.push_back(item);
        self.items.len()
    }

    /// Removes and returns the oldest item, or `None` if the queue is empty.
    pub fn dequeue_oldest(&mut self) -> Option<SyncItem> {
        self.items.pop_front()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue length packaged for the UI badge.
    pub fn info(&self) -> QueueInfo {
        QueueInfo::new(self.items.len())
    }
}

/// Display form of the queue length.
///
/// ```rust
/// use lanpaste_core::QueueInfo;
///
/// assert_eq!(QueueInfo::new(1).to_string(), "1 item waiting");
/// assert_eq!(QueueInfo::new(3).to_string(), "3 items waiting");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueInfo {
    count: usize,
}

impl QueueInfo {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn count(self) -> usize {
        self.count
    }

    /// `true` when there is something to accept; the UI enables its accept
    /// button on this.
    pub fn has_items(self) -> bool {
        self.count > 0
    }
}

impl fmt::Display for QueueInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count {
            1 => f.write_str("1 item waiting"),
            n => write!(f, "{n} items waiting"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> SyncItem {
        SyncItem::new(text, None)
    }

    #[test]
    fn test_new_queue_is_empty() {
        let queue = InboundQueue::new(4);
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 4);
    }

    #[test]
    fn test_enqueue_returns_new_length() {
        let mut queue = InboundQueue::new(4);
        assert_eq!(queue.enqueue(item("a")), 1);
        assert_eq!(queue.enqueue(item("b")), 2);
    }

    #[test]
    fn test_dequeue_returns_items_in_submission_order() {
        // Arrange
        let mut queue = InboundQueue::new(8);
        for text in ["A", "B", "C"] {
            queue.enqueue(item(text));
        }

        // Act
        let drained: Vec<String> = std::iter::from_fn(|| queue.dequeue_oldest())
            .map(|i| i.text)
            .collect();

        // Assert
        assert_eq!(drained, vec!["A", "B", "C"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dequeue_on_empty_queue_returns_none() {
        let mut queue = InboundQueue::new(2);
        assert!(queue.dequeue_oldest().is_none());
    }

    #[test]
    fn test_full_queue_evicts_oldest_item() {
        // Arrange
        let mut queue = InboundQueue::new(2);
        queue.enqueue(item("first"));
        queue.enqueue(item("second"));

        // Act: third submission overflows a queue of two
        let len = queue.enqueue(item("third"));

        // Assert: length stays at capacity and "first" is gone
        assert_eq!(len, 2);
        assert_eq!(queue.dequeue_oldest().map(|i| i.text).as_deref(), Some("second"));
        assert_eq!(queue.dequeue_oldest().map(|i| i.text).as_deref(), Some("third"));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut queue = InboundQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.enqueue(item("x"));
        queue.enqueue(item("y"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue_oldest().map(|i| i.text).as_deref(), Some("y"));
    }

    #[test]
    fn test_info_tracks_length() {
        let mut queue = InboundQueue::new(4);
        assert_eq!(queue.info().count(), 0);
        assert!(!queue.info().has_items());
        queue.enqueue(item("a"));
        assert_eq!(queue.info().count(), 1);
        assert!(queue.info().has_items());
    }

    #[test]
    fn test_queue_info_display() {
        assert_eq!(QueueInfo::new(0).to_string(), "0 items waiting");
        assert_eq!(QueueInfo::new(1).to_string(), "1 item waiting");
        assert_eq!(QueueInfo::new(12).to_string(), "12 items waiting");
    }
}

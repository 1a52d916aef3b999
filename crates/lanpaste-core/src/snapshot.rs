//! The single most recent text published by the local user.
//!
//! Peers fetch this value with `GET /content`.  Publishing overwrites the
//! previous value; no history is kept.

use std::time::SystemTime;

/// Value returned by [`OutboundSnapshot::current`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotValue {
    pub text: String,
    /// `None` until the first publish.
    pub published_at: Option<SystemTime>,
}

/// Holder of the outbound text.  Starts empty.
#[derive(Debug, Default)]
pub struct OutboundSnapshot {
    current: SnapshotValue,
}

impl OutboundSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored text and returns the publish time.
    pub fn publish(&mut self, text: impl Into<String>) -> SystemTime {
        let now = SystemTime::now();
        self.current = SnapshotValue {
            text: text.into(),
            published_at: Some(now),
        };
        now
    }

    /// Latest published value, or an empty value before any publish.
    pub fn current(&self) -> SnapshotValue {
        self.current.clone()
    }

    /// Borrowed view of the current text.
    pub fn text(&self) -> &str {
        &self.current.text
    }
}

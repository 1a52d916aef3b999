//! A text snippet submitted by a remote peer.

use std::net::SocketAddr;
use std::time::SystemTime;

use uuid::Uuid;

/// One piece of text received over the network and waiting for the local user
/// to accept it.
///
/// A `SyncItem` is created when the HTTP listener accepts a submission and is
/// owned by the [`InboundQueue`](crate::InboundQueue) until it is either
/// accepted (dequeued) or evicted because the queue is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncItem {
    /// Random identifier used to correlate log lines for this item.
    pub id: Uuid,
    /// The submitted text, stored verbatim.
    pub text: String,
    /// When the listener accepted the submission.
    pub received_at: SystemTime,
    /// TCP peer address of the submitting browser, when the transport
    /// reported one.
    pub remote_address: Option<SocketAddr>,
}

impl SyncItem {
    /// Creates an item stamped with the current time.
    pub fn new(text: impl Into<String>, remote_address: Option<SocketAddr>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            received_at: SystemTime::now(),
            remote_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_keeps_text_verbatim() {
        let item = SyncItem::new("  hello\n", None);
        assert_eq!(item.text, "  hello\n");
    }

    #[test]
    fn test_new_items_get_distinct_ids() {
        let a = SyncItem::new("a", None);
        let b = SyncItem::new("a", None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_new_item_records_remote_address() {
        let addr: SocketAddr = "192.168.1.20:51000".parse().unwrap();
        let item = SyncItem::new("x", Some(addr));
        assert_eq!(item.remote_address, Some(addr));
    }
}

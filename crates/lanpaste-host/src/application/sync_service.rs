//! Sync state operations shared by the HTTP router and the local UI.
//!
//! [`SyncService`] owns the inbound queue and the outbound snapshot behind a
//! single mutex and publishes one [`SyncEvent`] per state transition.  Both
//! drivers go through it:
//!
//! ```text
//! RequestRouter (socket events) ──► submit()          ──► serverInfo
//!                               ──► outbound()
//! SyncFacade   (user actions)   ──► publish_outbound() ──► sent
//!                               ──► accept_oldest()    ──► received + serverInfo
//!                               ──► report_clipboard() ──► clipboard
//! ```
//!
//! Every operation here is O(1) and never awaits, so the mutex is a plain
//! `std::sync::Mutex` and is never held across a suspension point.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use lanpaste_core::{
    InboundQueue, OutboundSnapshot, QueueInfo, SnapshotValue, SourceTag, SyncEvent, SyncItem,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::event_bus::EventBus;

/// Rejection of a remote submission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The form had no `content` field, or it was blank.
    #[error("submission has no usable `content` field")]
    MissingContent,
}

/// Queue and snapshot, always locked together.
struct SyncState {
    queue: InboundQueue,
    snapshot: OutboundSnapshot,
}

/// Owner of all mutable sync state.
pub struct SyncService {
    state: Mutex<SyncState>,
    bus: Arc<EventBus>,
}

impl SyncService {
    /// Creates a service with an empty queue bounded at `queue_capacity` and an
    /// empty snapshot.
    pub fn new(queue_capacity: usize, bus: Arc<EventBus>) -> Self {
        Self {
            state: Mutex::new(SyncState {
                queue: InboundQueue::new(queue_capacity),
                snapshot: OutboundSnapshot::new(),
            }),
            bus,
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    // ── Network path ──────────────────────────────────────────────────────────

    /// Accepts a submission from a remote peer into the inbound queue.
    ///
    /// `content` is `None` when the form had no such field.  Text that is empty
    /// after trimming is rejected; accepted text is stored untrimmed.
    ///
    /// Returns the new queue length.
    ///
    /// # Errors
    ///
    /// [`SubmitError::MissingContent`]; nothing is enqueued in that case.
    pub fn submit(
        &self,
        content: Option<String>,
        remote_address: Option<SocketAddr>,
    ) -> Result<usize, SubmitError> {
        let text = content
            .filter(|t| !t.trim().is_empty())
            .ok_or(SubmitError::MissingContent)?;

        let item = SyncItem::new(text, remote_address);
        let item_id = item.id;

        let mut state = self.lock_state();
        let len = state.queue.enqueue(item);
        self.bus
            .publish(SyncEvent::new(QueueInfo::new(len).to_string(), SourceTag::ServerInfo));
        drop(state);

        match remote_address {
            Some(peer) => info!("queued item {item_id} from {peer} (queue length {len})"),
            None => info!("queued item {item_id} (queue length {len})"),
        }
        Ok(len)
    }

    /// Current outbound snapshot, as served by `GET /content`.
    pub fn outbound(&self) -> SnapshotValue {
        self.lock_state().snapshot.current()
    }

    // ── Local user path ───────────────────────────────────────────────────────

    /// Replaces the outbound snapshot with `text` and publishes a `sent` event.
    pub fn publish_outbound(&self, text: impl Into<String>) -> SystemTime {
        let text = text.into();
        let mut state = self.lock_state();
        let published_at = state.snapshot.publish(text.clone());
        self.bus
            .publish(SyncEvent::at(text, SourceTag::Sent, published_at));
        drop(state);

        debug!("outbound snapshot updated");
        published_at
    }

    /// Removes the oldest queued item and publishes it as a `received` event,
    /// followed by the new queue length as a `serverInfo` event.
    ///
    /// A no-op returning `None` when the queue is empty.
    pub fn accept_oldest(&self) -> Option<SyncItem> {
        let mut state = self.lock_state();
        let item = state.queue.dequeue_oldest()?;
        let info = state.queue.info();
        self.bus
            .publish(SyncEvent::new(item.text.clone(), SourceTag::Received));
        self.bus
            .publish(SyncEvent::new(info.to_string(), SourceTag::ServerInfo));
        drop(state);

        debug!("accepted item {} ({} remaining)", item.id, info.count());
        Some(item)
    }

    /// Queue length for the UI badge.
    pub fn queue_info(&self) -> QueueInfo {
        self.lock_state().queue.info()
    }

    /// Publishes text read from the local clipboard.  Touches neither the
    /// queue nor the snapshot.
    pub fn report_clipboard(&self, text: impl Into<String>) {
        self.bus
            .publish(SyncEvent::new(text, SourceTag::Clipboard));
    }

    /// Publishes a server status line (listening address, stopped, ...).
    pub fn announce(&self, status: impl Into<String>) {
        self.bus
            .publish(SyncEvent::new(status, SourceTag::ServerInfo));
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::Receiver;

    fn make_service(capacity: usize) -> (SyncService, Receiver<SyncEvent>) {
        let bus = Arc::new(EventBus::default());
        let rx = bus.receiver();
        (SyncService::new(capacity, bus), rx)
    }

    #[test]
    fn test_submit_enqueues_and_returns_length() {
        let (service, _rx) = make_service(8);
        assert_eq!(service.submit(Some("Hello".into()), None), Ok(1));
        assert_eq!(service.submit(Some("World".into()), None), Ok(2));
        assert_eq!(service.queue_info().count(), 2);
    }

    #[test]
    fn test_submit_missing_content_is_rejected() {
        let (service, _rx) = make_service(8);
        assert_eq!(service.submit(None, None), Err(SubmitError::MissingContent));
        assert_eq!(service.queue_info().count(), 0);
    }

    #[test]
    fn test_submit_blank_content_is_rejected() {
        let (service, _rx) = make_service(8);
        assert_eq!(service.submit(Some(String::new()), None), Err(SubmitError::MissingContent));
        assert_eq!(service.submit(Some("  \n\t".into()), None), Err(SubmitError::MissingContent));
        assert_eq!(service.queue_info().count(), 0);
    }

    #[test]
    fn test_submit_keeps_surrounding_whitespace() {
        let (service, _rx) = make_service(8);
        service.submit(Some("  padded  ".into()), None).unwrap();
        assert_eq!(service.accept_oldest().unwrap().text, "  padded  ");
    }

    #[test]
    fn test_submit_publishes_queue_length() {
        // Arrange
        let (service, mut rx) = make_service(8);

        // Act
        service.submit(Some("a".into()), None).unwrap();

        // Assert
        let event = rx.try_recv().unwrap();
        assert_eq!(event.source, SourceTag::ServerInfo);
        assert_eq!(event.text, "1 item waiting");
    }

    #[test]
    fn test_accept_returns_items_fifo_and_publishes_received_then_count() {
        // Arrange
        let (service, mut rx) = make_service(8);
        service.submit(Some("A".into()), None).unwrap();
        service.submit(Some("B".into()), None).unwrap();
        while rx.try_recv().is_ok() {}

        // Act
        let first = service.accept_oldest().unwrap();

        // Assert
        assert_eq!(first.text, "A");
        let received = rx.try_recv().unwrap();
        assert_eq!(received.source, SourceTag::Received);
        assert_eq!(received.text, "A");
        let count = rx.try_recv().unwrap();
        assert_eq!(count.source, SourceTag::ServerInfo);
        assert_eq!(count.text, "1 item waiting");

        assert_eq!(service.accept_oldest().unwrap().text, "B");
    }

    #[test]
    fn test_accept_on_empty_queue_is_silent_noop() {
        let (service, mut rx) = make_service(8);
        assert!(service.accept_oldest().is_none());
        assert!(rx.try_recv().is_err(), "no event for an empty accept");
    }

    #[test]
    fn test_publish_outbound_overwrites_and_emits_sent() {
        // Arrange
        let (service, mut rx) = make_service(8);
        service.publish_outbound("old");

        // Act
        let ts = service.publish_outbound("Ready");

        // Assert
        assert_eq!(service.outbound().text, "Ready");
        assert_eq!(service.outbound().published_at, Some(ts));
        let _old = rx.try_recv().unwrap();
        let sent = rx.try_recv().unwrap();
        assert_eq!(sent.source, SourceTag::Sent);
        assert_eq!(sent.text, "Ready");
        assert_eq!(sent.updated_at, ts);
    }

    #[test]
    fn test_outbound_is_empty_before_any_publish() {
        let (service, _rx) = make_service(8);
        assert_eq!(service.outbound().text, "");
        assert!(service.outbound().published_at.is_none());
    }

    #[test]
    fn test_report_clipboard_does_not_touch_queue_or_snapshot() {
        let (service, mut rx) = make_service(8);
        service.report_clipboard("copied");
        let event = rx.try_recv().unwrap();
        assert_eq!(event.source, SourceTag::Clipboard);
        assert_eq!(event.text, "copied");
        assert_eq!(service.queue_info().count(), 0);
        assert_eq!(service.outbound().text, "");
    }

    #[test]
    fn test_overflow_evicts_oldest_but_submission_succeeds() {
        let (service, _rx) = make_service(2);
        service.submit(Some("1".into()), None).unwrap();
        service.submit(Some("2".into()), None).unwrap();
        assert_eq!(service.submit(Some("3".into()), None), Ok(2));
        assert_eq!(service.accept_oldest().unwrap().text, "2");
    }

    #[test]
    fn test_last_queue_event_matches_length() {
        let (service, mut rx) = make_service(8);
        service.submit(Some("a".into()), None).unwrap();
        service.submit(Some("b".into()), None).unwrap();
        service.accept_oldest();

        let mut last_info = None;
        while let Ok(event) = rx.try_recv() {
            if event.source == SourceTag::ServerInfo {
                last_info = Some(event.text);
            }
        }
        assert_eq!(last_info.as_deref(), Some("1 item waiting"));
        assert_eq!(service.queue_info().count(), 1);
    }
}

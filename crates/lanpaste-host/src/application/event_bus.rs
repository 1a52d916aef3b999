//! Broadcast of [`SyncEvent`]s to every interested part of the application.
//!
//! The UI is one subscriber among several (the console logger in `main.rs` is
//! another).  Two ways to subscribe are offered:
//!
//! - [`EventBus::subscribe`] registers a callback and returns a
//!   [`SubscriptionToken`] for [`EventBus::unsubscribe`].  Each callback runs
//!   on its own Tokio task, fed from the broadcast channel, so a callback may
//!   call straight back into the facade without deadlocking the publisher.
//! - [`EventBus::receiver`] hands out a raw `broadcast::Receiver` for async
//!   consumers that want to `select!` over events themselves.
//!
//! Publishing is a non-blocking `broadcast::Sender::send`, so callers may
//! publish while holding their own state lock; that is how event order is
//! kept identical to mutation order.
//!
//! [`EventBus::close`] drops the sender.  Subscribers drain what was already
//! published and then stop; later publishes are discarded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use lanpaste_core::SyncEvent;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Default number of events buffered per subscriber before it starts lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

/// Errors from [`EventBus::subscribe`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventBusError {
    /// `close()` has already been called.
    #[error("event bus is closed")]
    Closed,
    /// Callback subscribers need a Tokio runtime to run on.
    #[error("subscribe called outside of a Tokio runtime")]
    NoRuntime,
}

/// Single-producer, multi-subscriber fan-out of sync events.
pub struct EventBus {
    /// `None` once the bus has been closed.
    sender: Mutex<Option<broadcast::Sender<SyncEvent>>>,
    /// Pump task of every callback subscriber, keyed by token.
    handlers: Mutex<HashMap<u64, JoinHandle<()>>>,
    next_token: AtomicU64,
}

impl EventBus {
    /// Creates a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Mutex::new(Some(sender)),
            handlers: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        }
    }

    /// Registers `handler` to be called with every event published from now
    /// on, in publish order.
    ///
    /// # Errors
    ///
    /// [`EventBusError::Closed`] after [`close`](Self::close), and
    /// [`EventBusError::NoRuntime`] when not called inside a Tokio runtime.
    pub fn subscribe<F>(&self, handler: F) -> Result<SubscriptionToken, EventBusError>
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| EventBusError::NoRuntime)?;
        let mut rx = self
            .lock_sender()
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or(EventBusError::Closed)?;

        let id = self.next_token.fetch_add(1, Ordering::Relaxed);
        let task = runtime.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(&event),
                    Err(RecvError::Lagged(n)) => {
                        warn!("event subscriber {id} lagged; {n} event(s) skipped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("event subscriber {id} finished");
        });

        self.lock_handlers().insert(id, task);
        Ok(SubscriptionToken(id))
    }

    /// Stops delivering events to the subscriber behind `token`.
    ///
    /// Returns `false` if the token is unknown or was already removed.
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        match self.lock_handlers().remove(&token.0) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Raw receiver for async consumers.
    ///
    /// After `close()` the returned receiver reports `RecvError::Closed`
    /// immediately.
    pub fn receiver(&self) -> broadcast::Receiver<SyncEvent> {
        match self.lock_sender().as_ref() {
            Some(sender) => sender.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    /// Sends `event` to every subscriber.
    ///
    /// Returns `false` if the bus is closed and the event was discarded.  Having
    /// no subscribers at all is not an error.
    pub fn publish(&self, event: SyncEvent) -> bool {
        let guard = self.lock_sender();
        let Some(sender) = guard.as_ref() else {
            debug!("event bus closed; dropping {} event", event.source);
            return false;
        };
        let source = event.source;
        match sender.send(event) {
            Ok(n) => trace!("published {source} event ({n} receivers)"),
            Err(_) => trace!("published {source} event (no receivers)"),
        }
        true
    }

    /// Closes the bus for new publications and forgets every callback
    /// subscriber.  Events already published are still delivered.
    ///
    /// Safe to call more than once.
    pub fn close(&self) {
        let dropped = self.lock_sender().take();
        // Pump tasks end by themselves once they have drained the channel.
        self.lock_handlers().clear();
        if dropped.is_some() {
            debug!("event bus closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock_sender().is_none()
    }

    /// Number of registered callback subscribers.
    pub fn handler_count(&self) -> usize {
        self.lock_handlers().len()
    }

    fn lock_sender(&self) -> std::sync::MutexGuard<'_, Option<broadcast::Sender<SyncEvent>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_handlers(&self) -> std::sync::MutexGuard<'_, HashMap<u64, JoinHandle<()>>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        for (_, task) in self.lock_handlers().drain() {
            task.abort();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

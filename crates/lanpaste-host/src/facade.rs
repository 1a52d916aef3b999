//! [`SyncFacade`]: the one object the UI talks to.
//!
//! The facade owns the listener, the sync state and the event bus, and maps
//! each user action onto them:
//!
//! | UI action               | Effect                                             |
//! |-------------------------|----------------------------------------------------|
//! | `init()`                | bind the listener, announce the URL                |
//! | `on_send_pressed(t)`    | publish `t` as the outbound snapshot (`sent`)      |
//! | `on_retrieve_pressed()` | take the oldest queued item (`received`)           |
//! | `paste_from_clipboard()`| read the clipboard (`clipboard`)                   |
//! | `queue_info()`          | queue length for the badge                         |
//! | `dispose()`             | stop the listener, announce `stopped`, close bus   |
//!
//! The UI observes results through [`SyncFacade::subscribe`] or
//! [`SyncFacade::events`]; no action returns UI state directly except the
//! value it produced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use lanpaste_core::{QueueInfo, ServerConfig, ServerConfigError, ServerState, SyncEvent, SyncItem};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

use crate::application::{EventBus, EventBusError, SubscriptionToken, SyncService};
use crate::infrastructure::clipboard::{ClipboardError, ClipboardSource};
use crate::infrastructure::{
    build_router, BoundAddress, RouterState, ServerError, ServerLifecycleManager, TemplateRenderer,
};

/// Status line published as a `serverInfo` event once the listener is closed.
pub const STOPPED_STATUS: &str = "stopped";

/// Prefix of the `serverInfo` status published when `init()` fails.
pub const START_FAILED_STATUS: &str = "Server failed to start";

/// Errors surfaced to the UI.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ServerConfigError),

    #[error(transparent)]
    Events(#[from] EventBusError),

    /// `dispose()` has been called; the facade cannot be restarted.
    #[error("sync engine has been disposed")]
    Disposed,
}

/// Public surface of the local sync engine.
pub struct SyncFacade {
    config: ServerConfig,
    bus: Arc<EventBus>,
    service: Arc<SyncService>,
    renderer: Arc<TemplateRenderer>,
    lifecycle: ServerLifecycleManager,
    clipboard: Arc<dyn ClipboardSource>,
    /// Serialises `init()` against `dispose()`.
    transition: Mutex<()>,
    disposed: AtomicBool,
}

impl SyncFacade {
    /// Builds a stopped facade from an immutable configuration.
    ///
    /// # Errors
    ///
    /// [`SyncError::Config`] if `config` fails validation.
    pub fn new(config: ServerConfig, clipboard: Arc<dyn ClipboardSource>) -> Result<Self, SyncError> {
        config.validate()?;

        let bus = Arc::new(EventBus::default());
        let service = Arc::new(SyncService::new(config.queue_capacity, Arc::clone(&bus)));
        let renderer = Arc::new(TemplateRenderer::from_config(&config));

        Ok(Self {
            config,
            bus,
            service,
            renderer,
            lifecycle: ServerLifecycleManager::new(),
            clipboard,
            transition: Mutex::new(()),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Guest-mode preference, carried through for the UI.
    pub fn guest_mode(&self) -> bool {
        self.config.guest_mode
    }

    pub fn server_state(&self) -> ServerState {
        self.lifecycle.state()
    }

    /// Address of the running listener, if any.
    pub async fn bound_address(&self) -> Option<BoundAddress> {
        self.lifecycle.bound_address().await
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Binds the listener and starts serving the page and `/content`.
    ///
    /// Publishes a `serverInfo` event with the listen URL on success.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Server`] wrapping [`ServerError::AlreadyRunning`] when
    ///   called twice without `dispose()`; the running listener is untouched.
    /// - [`SyncError::Server`] wrapping [`ServerError::Bind`] if the port is
    ///   unavailable.  The state stays `Stopped`.
    /// - [`SyncError::Disposed`] after `dispose()`.
    ///
    /// A failed start is also published as a `serverInfo` status line.
    pub async fn init(&self) -> Result<BoundAddress, SyncError> {
        let _transition = self.transition.lock().await;
        if self.disposed.load(Ordering::Acquire) {
            return Err(SyncError::Disposed);
        }

        let service = Arc::clone(&self.service);
        let renderer = Arc::clone(&self.renderer);
        let max_body_bytes = self.config.max_body_bytes;

        let started = self
            .lifecycle
            .start(self.config.bind_addr(), move |bound, server_state| {
                build_router(
                    RouterState {
                        service,
                        renderer,
                        bound,
                        server_state,
                    },
                    max_body_bytes,
                )
            })
            .await;

        match started {
            Ok(bound) => {
                self.service.announce(format!("Listening on {}", bound.url()));
                Ok(bound)
            }
            Err(e) => {
                self.service.announce(format!("{START_FAILED_STATUS}: {e}"));
                Err(e.into())
            }
        }
    }

    /// Stops the listener, publishes a final `stopped` status and closes the
    /// event bus.
    ///
    /// Safe to call repeatedly and while requests are in flight; only the
    /// first call does anything.
    pub async fn dispose(&self) {
        let _transition = self.transition.lock().await;
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Err(e) = self.lifecycle.stop().await {
            error!("error while stopping listener: {e}");
        }
        self.service.announce(STOPPED_STATUS);
        self.bus.close();
        info!("sync engine disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    // ── User actions ──────────────────────────────────────────────────────────

    /// Makes `text` the snapshot served on `GET /content`.
    pub fn on_send_pressed(&self, text: impl Into<String>) -> SystemTime {
        self.service.publish_outbound(text)
    }

    /// Takes the oldest queued item.  `None` (and no event) when the queue is
    /// empty.
    pub fn on_retrieve_pressed(&self) -> Option<SyncItem> {
        self.service.accept_oldest()
    }

    /// Reads the system clipboard and publishes its text as a `clipboard`
    /// event.  The queue and snapshot are left alone.
    ///
    /// # Errors
    ///
    /// [`SyncError::Clipboard`] if the clipboard is unavailable or holds no
    /// text; nothing is published in that case.
    pub fn paste_from_clipboard(&self) -> Result<String, SyncError> {
        let text = self.clipboard.read_text().map_err(|e| {
            warn!("clipboard read failed: {e}");
            e
        })?;
        self.service.report_clipboard(text.clone());
        Ok(text)
    }

    pub fn queue_info(&self) -> QueueInfo {
        self.service.queue_info()
    }

    /// Text currently served on `GET /content`.
    pub fn outbound_text(&self) -> String {
        self.service.outbound().text
    }

    // ── Observation ───────────────────────────────────────────────────────────

    /// Registers a callback for every future event.
    ///
    /// # Errors
    ///
    /// [`SyncError::Events`] after `dispose()` or outside a Tokio runtime.
    pub fn subscribe<F>(&self, handler: F) -> Result<SubscriptionToken, SyncError>
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        Ok(self.bus.subscribe(handler)?)
    }

    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.bus.unsubscribe(token)
    }

    /// Raw event stream for async consumers.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.bus.receiver()
    }

}

// ── Tests ─────────────────────────────────────────────────────────────────────

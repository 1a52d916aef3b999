//! Listener lifecycle: bind, serve, and shut down the HTTP socket.
//!
//! [`ServerLifecycleManager`] owns the listening socket and drives the
//! [`ServerState`] machine:
//!
//! ```text
//! Stopped ─► Starting ─► Running ─► Stopping ─► Stopped
//!               │
//!               └─ bind failed ─► Stopped
//! ```
//!
//! # Serving
//!
//! Once bound, the listener is handed to `axum::serve` on its own Tokio task.
//! Every accepted connection is handled on a separate task by axum/hyper, so
//! one slow browser never blocks the others.
//!
//! # Shutdown
//!
//! `stop()` fires a oneshot that triggers axum's graceful shutdown: the
//! listener closes immediately and in-flight requests get
//! [`SHUTDOWN_GRACE`] to finish before the serving task is aborted.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use lanpaste_core::ServerState;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// How long `stop()` waits for in-flight requests.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Errors from starting or stopping the listener.
#[derive(Debug, Error)]
pub enum ServerError {
    /// `start()` was called while a listener is starting or running.
    #[error("server is already running")]
    AlreadyRunning,

    /// The port is in use or the process may not bind it.
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The serving task panicked while shutting down.
    #[error("server task failed during shutdown: {0}")]
    Shutdown(String),
}

// ── Bound address ─────────────────────────────────────────────────────────────

/// The address the listener actually bound, reported by `start()`.
///
/// For a configured port of 0 this carries the ephemeral port the OS chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundAddress {
    addr: SocketAddr,
}

impl BoundAddress {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Host to write into the served page's `{{HOST}}` placeholder.
    ///
    /// A listener bound to a specific address reports that address.  One bound
    /// to every interface cannot know which of them the browser used, so the
    /// host part of the request's `Host` header is taken instead.  A header
    /// that is not an IP literal or a plain hostname is ignored, as is a
    /// missing one; the loopback address is used then.
    pub fn page_host(&self, host_header: Option<&str>) -> String {
        if !self.addr.ip().is_unspecified() {
            return format_host(self.addr.ip());
        }
        host_header
            .map(strip_port)
            .filter(|h| is_plain_host(h))
            .map(str::to_string)
            .unwrap_or_else(|| format_host(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }

    /// Base URL shown in status messages.
    pub fn url(&self) -> String {
        let host = if self.addr.ip().is_unspecified() {
            format_host(IpAddr::V4(Ipv4Addr::LOCALHOST))
        } else {
            format_host(self.addr.ip())
        };
        format!("http://{host}:{}", self.addr.port())
    }
}

impl fmt::Display for BoundAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.addr.fmt(f)
    }
}

/// IPv6 literals need brackets inside URLs.
fn format_host(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    }
}

/// `"host:port"` → `"host"`, `"[::1]:80"` → `"[::1]"`, `"host"` → `"host"`.
fn strip_port(host_header: &str) -> &str {
    let value = host_header.trim();
    if value.starts_with('[') {
        return match value.find(']') {
            Some(end) => &value[..=end],
            None => value,
        };
    }
    match value.rsplit_once(':') {
        Some((host, _port)) => host,
        None => value,
    }
}

/// `true` for an IPv4 literal, a bracketed IPv6 literal, or a hostname made
/// of ASCII letters, digits, dots and hyphens.  Anything else must not reach
/// the rendered page.
fn is_plain_host(host: &str) -> bool {
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return inner.parse::<Ipv6Addr>().is_ok();
    }
    if host.parse::<IpAddr>().is_ok() {
        return true;
    }
    !host.is_empty()
        && host
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-')
}

// ── Shared state cell ─────────────────────────────────────────────────────────

/// Lock-free view of the current [`ServerState`], shared with the router so
/// it can refuse requests unless the server is `Running`.
#[derive(Debug, Clone, Default)]
pub struct ServerStateCell(Arc<AtomicU8>);

impl ServerStateCell {
    pub fn new(state: ServerState) -> Self {
        Self(Arc::new(AtomicU8::new(state.as_u8())))
    }

    pub fn get(&self) -> ServerState {
        ServerState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ServerState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }
}

// ── Lifecycle manager ─────────────────────────────────────────────────────────

struct RunningServer {
    bound: BoundAddress,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Owner of the listening socket.
///
/// The async mutex is held across the `bind` await so that two concurrent
/// `start()` calls are serialised: the second one observes `Running` and
/// fails with [`ServerError::AlreadyRunning`].
pub struct ServerLifecycleManager {
    state: ServerStateCell,
    running: Mutex<Option<RunningServer>>,
}

impl ServerLifecycleManager {
    pub fn new() -> Self {
        Self {
            state: ServerStateCell::new(ServerState::Stopped),
            running: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ServerState {
        self.state.get()
    }

    /// Cell the router reads to gate requests.
    pub fn state_cell(&self) -> ServerStateCell {
        self.state.clone()
    }

    /// Address of the running listener, if any.
    pub async fn bound_address(&self) -> Option<BoundAddress> {
        self.running.lock().await.as_ref().map(|server| server.bound)
    }

    /// Binds `bind_addr` and starts serving the router built by `make_router`.
    ///
    /// `make_router` receives the actual bound address (so pages can show the
    /// real port) and the state cell to gate requests on.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyRunning`] if a listener is starting or running;
    ///   that listener is left untouched.
    /// - [`ServerError::Bind`] if the port is unavailable; the state returns to
    ///   `Stopped` and nothing is retried.
    pub async fn start<F>(&self, bind_addr: SocketAddr, make_router: F) -> Result<BoundAddress, ServerError>
    where
        F: FnOnce(BoundAddress, ServerStateCell) -> Router,
    {
        let mut slot = self.running.lock().await;
        if slot.is_some() || self.state.get().is_active() {
            warn!("start requested while server is {}", self.state.get());
            return Err(ServerError::AlreadyRunning);
        }

        self.state.set(ServerState::Starting);

        let listener = match TcpListener::bind(bind_addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.state.set(ServerState::Stopped);
                error!("failed to bind HTTP listener on {bind_addr}: {source}");
                return Err(ServerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                self.state.set(ServerState::Stopped);
                return Err(ServerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };

        let bound = BoundAddress::new(local_addr);
        let router = make_router(bound, self.state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        // Running before the first accept, so no request ever sees `Starting`.
        self.state.set(ServerState::Running);

        let task = tokio::spawn(async move {
            let service = router.into_make_service_with_connect_info::<SocketAddr>();
            let result = axum::serve(listener, service)
                .with_graceful_shutdown(async move {
                    // A dropped sender also means "shut down".
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                error!("HTTP server on {local_addr} failed: {e}");
            }
        });

        *slot = Some(RunningServer {
            bound,
            shutdown: shutdown_tx,
            task,
        });

        info!("HTTP listener running on {local_addr}");
        Ok(bound)
    }

    /// Closes the listener and waits briefly for in-flight requests.
    ///
    /// Idempotent: stopping a stopped server succeeds without doing anything.
    ///
    /// # Errors
    ///
    /// [`ServerError::Shutdown`] if the serving task panicked.  The state is
    /// `Stopped` afterwards either way.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let mut slot = self.running.lock().await;
        let Some(server) = slot.take() else {
            self.state.set(ServerState::Stopped);
            return Ok(());
        };

        self.state.set(ServerState::Stopping);
        let _ = server.shutdown.send(());

        let mut task = server.task;
        let outcome = match timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(join_err)) if join_err.is_panic() => {
                Err(ServerError::Shutdown(join_err.to_string()))
            }
            Ok(Err(_cancelled)) => Ok(()),
            Err(_elapsed) => {
                warn!(
                    "in-flight requests still open after {:?}; closing them",
                    SHUTDOWN_GRACE
                );
                task.abort();
                Ok(())
            }
        };

        self.state.set(ServerState::Stopped);
        info!("HTTP listener on {} stopped", server.bound);
        outcome
    }
}

impl Default for ServerLifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

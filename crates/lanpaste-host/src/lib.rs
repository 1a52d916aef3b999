//! lanpaste-host library crate.
//!
//! This crate runs the local sync engine of LanPaste: an embedded HTTP
//! listener that any browser on the LAN can use to drop text into this
//! device's inbound queue or fetch the text this device has published.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Browser (HTML form / plain-text fetch over HTTP)
//!         ↕
//! [lanpaste-host]
//!   ├── application/      EventBus, SyncService (queue + snapshot + events)
//!   ├── infrastructure/
//!   │     ├── http_router/ axum routes: GET /, GET /content, POST /content
//!   │     ├── server/      listener lifecycle state machine
//!   │     ├── template/    page template loading with fail-safe fallback
//!   │     ├── clipboard/   system clipboard adapter
//!   │     └── storage/     TOML config file
//!   └── facade            SyncFacade: the surface the UI calls
//! ```
//!
//! # Layer rules
//!
//! - `application` depends on `lanpaste-core` only (plus `tokio::sync` for the
//!   event fan-out).  It never opens sockets or files.
//! - `infrastructure` depends on `application` and the I/O crates.
//! - `facade` wires the two together; the UI only talks to the facade and
//!   observes the event bus.

/// Application layer: event bus and sync state operations.
pub mod application;

/// Infrastructure layer: HTTP listener, template file, clipboard, config.
pub mod infrastructure;

/// Public surface composed from the other layers.
pub mod facade;

pub use facade::{SyncError, SyncFacade};

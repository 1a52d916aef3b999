//! # lanpaste-core
//!
//! Shared library for LanPaste containing the domain entities of the local
//! sync engine: the text items received from the network, the events the rest
//! of the application observes, and the two stores that hold sync state.
//!
//! It has zero dependencies on sockets, async runtimes, or UI frameworks.
//!
//! # Architecture overview (for beginners)
//!
//! LanPaste lets devices on the same local network pass short text snippets to
//! each other without an account or cloud service.  One device runs a small
//! HTTP listener; any browser on the LAN can open its page, submit text into
//! the host's *inbound queue*, or fetch the text the host has published as its
//! *outbound snapshot*.
//!
//! This crate (`lanpaste-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Plain data: [`SyncItem`], [`SyncEvent`] with its
//!   [`SourceTag`], the [`ServerState`] lifecycle enum, and the immutable
//!   [`ServerConfig`].
//!
//! - **`queue`** – The bounded FIFO [`InboundQueue`] with a drop-oldest
//!   eviction policy.
//!
//! - **`snapshot`** – The single-value [`OutboundSnapshot`].
//!
//! - **`template`** – Flat `{{HOST}}` / `{{PORT}}` placeholder substitution for
//!   the served HTML page.

pub mod domain;
pub mod queue;
pub mod snapshot;
pub mod template;

// Re-export the most-used types at the crate root so callers can write
// `lanpaste_core::SyncItem` instead of `lanpaste_core::domain::item::SyncItem`.
pub use domain::config::{
    ServerConfig, ServerConfigError, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT, DEFAULT_QUEUE_CAPACITY,
    FAIL_SAFE_HTML_TEMPLATE,
};
pub use domain::event::{SourceTag, SyncEvent};
pub use domain::item::SyncItem;
pub use domain::state::ServerState;
pub use queue::{InboundQueue, QueueInfo};
pub use snapshot::{OutboundSnapshot, SnapshotValue};
pub use template::substitute_placeholders;

//! Application layer for lanpaste-host.
//!
//! The application layer owns the sync state and decides which events each
//! state change produces.  It knows *what* happens when text is submitted,
//! published, or accepted, but not *how* the request arrived.
//!
//! # Responsibilities
//!
//! - Holding the inbound queue and outbound snapshot behind one mutex
//! - Publishing one `SyncEvent` per state transition
//! - Fanning events out to every subscriber
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or parsing HTTP (that is infrastructure)
//! - Reading the template file or the clipboard (that is infrastructure)

pub mod event_bus;
pub mod sync_service;

pub use event_bus::{EventBus, EventBusError, SubscriptionToken};
pub use sync_service::{SubmitError, SyncService};

//! Domain layer for lanpaste.
//!
//! The domain layer contains pure business-logic types that have no
//! dependencies on I/O, networking, or external frameworks.
//!
//! # What belongs in the domain layer?
//!
//! - The data carried through the sync engine (items, events)
//! - The server lifecycle states
//! - Configuration structures
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpListener`, or HTTP types
//! - File I/O or environment variable reading

pub mod config;
pub mod event;
pub mod item;
pub mod state;

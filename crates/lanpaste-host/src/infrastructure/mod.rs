//! Infrastructure layer for lanpaste-host.
//!
//! The infrastructure layer handles all I/O: the listening socket, HTTP
//! parsing, the template file, the clipboard, and the config file.
//!
//! # Responsibilities
//!
//! - Binding and closing the TCP listener, tracking its lifecycle state
//! - Mapping HTTP requests onto the application layer's `SyncService`
//! - Reading the page template with a fail-safe fallback
//! - Reading the system clipboard
//! - Loading and saving the TOML configuration
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `lanpaste_core`, but MUST NOT be imported by the `application` layer.

pub mod clipboard;
pub mod http_router;
pub mod server;
pub mod storage;
pub mod template;

pub use http_router::{build_router, RouterState};
pub use server::{BoundAddress, ServerError, ServerLifecycleManager, ServerStateCell};
pub use template::{TemplateError, TemplateRenderer};

//! Server configuration types.
//!
//! [`ServerConfig`] is the single source of truth for the listener's runtime
//! settings.  It is built once (from the config file and CLI in the host
//! binary, or from defaults in tests) and never mutated while a server
//! instance is running.  There are no global settings; whoever constructs the
//! facade passes the config in.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

/// Port the listener binds when nothing else is configured.
pub const DEFAULT_PORT: u16 = 2234;

/// Default bound of the inbound queue before the oldest item is evicted.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default largest accepted `POST /content` body, in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Minimal page served when the configured template file cannot be read.
///
/// Contains the `{{HOST}}` and `{{PORT}}` placeholders, which are substituted
/// exactly like those of a file template.
pub const FAIL_SAFE_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>LanPaste</title>
</head>
<body>
<h1>LanPaste</h1>
<form action="http://{{HOST}}:{{PORT}}/content" method="post">
<textarea name="content" rows="8" cols="40"></textarea>
<br>
<button type="submit">Send</button>
</form>
<p><a href="http://{{HOST}}:{{PORT}}/content">Fetch shared text</a></p>
</body>
</html>
"#;

/// Errors reported by [`ServerConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServerConfigError {
    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,
    #[error("maximum body size must be at least 1 byte")]
    ZeroBodyLimit,
}

/// All runtime configuration for the sync listener.
///
/// # Example
///
/// ```rust
/// use lanpaste_core::ServerConfig;
///
/// let cfg = ServerConfig::default();
/// assert_eq!(cfg.port, 2234);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface the listener binds to.  `0.0.0.0` accepts connections from
    /// the whole LAN; `127.0.0.1` restricts it to this machine.
    pub bind_ip: IpAddr,

    /// TCP port.  `0` asks the OS for an ephemeral port, which the lifecycle
    /// manager reports back once bound.
    pub port: u16,

    /// HTML page template read on every `GET /`.  A relative path resolves
    /// against the process working directory.
    pub template_path: PathBuf,

    /// Page used when `template_path` cannot be read.
    pub fail_safe_template: String,

    /// Number of items the inbound queue holds before evicting the oldest.
    pub queue_capacity: usize,

    /// Largest accepted submission body.
    pub max_body_bytes: usize,

    /// Guest mode flag from the preferences store.  The sync engine does not
    /// act on it; it is carried so the UI layer can read it back.
    pub guest_mode: bool,
}

impl ServerConfig {
    /// Socket address the listener binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Checks the invariants the queue and router rely on.
    pub fn validate(&self) -> Result<(), ServerConfigError> {
        if self.queue_capacity == 0 {
            return Err(ServerConfigError::ZeroQueueCapacity);
        }
        if self.max_body_bytes == 0 {
            return Err(ServerConfigError::ZeroBodyLimit);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    /// | Field              | Default                     |
    /// |--------------------|-----------------------------|
    /// | bind_ip            | `0.0.0.0`                   |
    /// | port               | `2234`                      |
    /// | template_path      | `assets/index.html`         |
    /// | fail_safe_template | [`FAIL_SAFE_HTML_TEMPLATE`] |
    /// | queue_capacity     | 64                          |
    /// | max_body_bytes     | 64 KiB                      |
    /// | guest_mode         | `false`                     |
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            template_path: PathBuf::from("assets/index.html"),
            fail_safe_template: FAIL_SAFE_HTML_TEMPLATE.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            guest_mode: false,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

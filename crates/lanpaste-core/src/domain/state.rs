//! Lifecycle states of the HTTP listener.
//!
//! ```text
//! Stopped ──start()──► Starting ──bind ok──► Running
//!    ▲                    │                     │
//!    │                bind failed            stop()
//!    │                    │                     ▼
//!    └────────────────────┴────────────────  Stopping
//! ```

use std::fmt;

/// Current state of the listener owned by the server lifecycle manager.
///
/// At most one listener per facade is ever `Starting` or `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl ServerState {
    /// `true` while a listener is being bound or is serving.
    ///
    /// A second `start` in either of these states is rejected.
    pub fn is_active(self) -> bool {
        matches!(self, ServerState::Starting | ServerState::Running)
    }

    /// Compact encoding so the state can live in an `AtomicU8`.
    pub fn as_u8(self) -> u8 {
        match self {
            ServerState::Stopped => 0,
            ServerState::Starting => 1,
            ServerState::Running => 2,
            ServerState::Stopping => 3,
        }
    }

    /// Inverse of [`as_u8`](Self::as_u8).  Unknown values decode as `Stopped`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ServerState::Starting,
            2 => ServerState::Running,
            3 => ServerState::Stopping,
            _ => ServerState::Stopped,
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Stopped => "stopped",
            ServerState::Starting => "starting",
            ServerState::Running => "running",
            ServerState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

//! Connection lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of the managed connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No handle is held.
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// A handle is held and was reachable when last checked.
    Connected,
    /// The last connect attempt failed.
    Error(String),
}

impl ConnectionState {
    /// Whether a handle is held.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Error(_) => write!(f, "error"),
        }
    }
}

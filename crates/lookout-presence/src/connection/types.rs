//! Configuration, status, and channel message types for the connection layer.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// WebSocket close code sent on teardown.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close reason sent on teardown.
pub const TEARDOWN_REASON: &str = "Component unmounted";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for one connection session.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Full WebSocket URL, including the api key query parameter.
    pub url: String,
    /// Period of the keep-alive probe.
    pub keepalive_interval: Duration,
    /// Delay before reconnecting after an unexpected close.
    pub reconnect_delay: Duration,
    /// Maximum time a connect handshake may take.
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    /// The URL without its query string, safe to log.
    pub fn redacted_url(&self) -> &str {
        self.url.split('?').next().unwrap_or("")
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.redacted_url())
            .field("keepalive_interval", &self.keepalive_interval)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Logical state of the connection as seen by observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    #[default]
    Disconnected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Error => "error",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Driver channels
// ---------------------------------------------------------------------------

/// Sent by the driver to the sync task, in order.
#[derive(Debug)]
pub(crate) enum ConnectionEvent {
    Status(ConnectionStatus),
    /// A raw text frame, not yet decoded.
    Frame(String),
    /// The driver finished teardown; fire `done` once everything before
    /// this event has been applied.
    Stopped { done: oneshot::Sender<()> },
}

/// Sent by the client handle to the driver.
#[derive(Debug)]
pub(crate) enum ConnectionCommand {
    Open,
    RequestRefresh,
    Teardown { done: oneshot::Sender<()> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_api_key() {
        let config = ConnectionConfig {
            url: "wss://presence.example.com/?apiKey=secret".into(),
            keepalive_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(15),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("wss://presence.example.com/"));
    }

    #[test]
    fn status_display_and_default() {
        assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
        assert_eq!(ConnectionStatus::Connected.to_string(), "connected");
        assert_eq!(ConnectionStatus::Error.to_string(), "error");
    }
}

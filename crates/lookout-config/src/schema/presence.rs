//! Presence server connection settings.

use serde::{Deserialize, Serialize};

/// Presence client configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Presence server host, with an optional port (e.g. `presence.example.com:8080`).
    pub server: String,
    /// Path of the WebSocket endpoint on `server`.
    pub ws_path: String,
    /// Use `wss`/`https` instead of `ws`/`http`.
    pub secure: bool,
    pub api_key: String,
    /// Base URL of the HTTP API. Derived from `server` and `secure` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_endpoint: Option<String>,
    /// Keep-alive probe period in seconds (valid range: 1-300).
    pub keepalive_interval_secs: u32,
    /// Delay before reconnecting after an unexpected close (valid range: 1-60).
    pub reconnect_delay_secs: u32,
    /// Connect handshake timeout in seconds (valid range: 1-120).
    pub connect_timeout_secs: u32,
    /// Buffered events per subscriber before slow ones lag (valid range: 1-65536).
    pub event_channel_capacity: u32,
}

impl std::fmt::Debug for PresenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceConfig")
            .field("server", &self.server)
            .field("ws_path", &self.ws_path)
            .field("secure", &self.secure)
            .field("api_key", &"[REDACTED]")
            .field("http_endpoint", &self.http_endpoint)
            .field("keepalive_interval_secs", &self.keepalive_interval_secs)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("event_channel_capacity", &self.event_channel_capacity)
            .finish()
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            ws_path: "/".into(),
            secure: true,
            api_key: String::new(),
            http_endpoint: None,
            keepalive_interval_secs: 30,
            reconnect_delay_secs: 3,
            connect_timeout_secs: 15,
            event_channel_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = PresenceConfig {
            api_key: "pk_live_secret".into(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("pk_live_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let config: PresenceConfig = toml::from_str(r#"server = "localhost:8080""#).unwrap();
        assert_eq!(config.server, "localhost:8080");
        assert!(config.secure);
        assert_eq!(config.keepalive_interval_secs, 30);
        assert_eq!(config.http_endpoint, None);
    }
}

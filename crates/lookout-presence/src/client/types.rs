//! Configuration and event types for the presence sync client.

use std::fmt;
use std::time::Duration;

use reqwest::Url;

use lookout_common::ConfigError;

use crate::connection::ConnectionStatus;
use crate::invite::INVITE_PATH;
use crate::protocol::Visitor;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the presence sync client.
#[derive(Clone)]
pub struct PresenceConfig {
    /// Host (and optional port) of the presence server, without scheme.
    pub server: String,
    /// Path of the WebSocket endpoint.
    pub ws_path: String,
    /// Use `wss`/`https` instead of `ws`/`http`.
    pub secure: bool,
    pub api_key: String,
    /// Base URL for HTTP calls; derived from `server` when `None`.
    pub http_endpoint: Option<String>,
    pub keepalive_interval: Duration,
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
    /// Buffer size of the `subscribe()` channel.
    pub event_channel_capacity: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            ws_path: "/".to_string(),
            secure: true,
            api_key: String::new(),
            http_endpoint: None,
            keepalive_interval: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(15),
            event_channel_capacity: 256,
        }
    }
}

impl PresenceConfig {
    /// WebSocket URL with the api key attached as the `apiKey` query parameter.
    pub fn ws_url(&self) -> Result<String, ConfigError> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(ConfigError::ValidationError(
                "presence server address is empty".into(),
            ));
        }

        let scheme = if self.secure { "wss" } else { "ws" };
        let path = if self.ws_path.starts_with('/') {
            self.ws_path.clone()
        } else {
            format!("/{}", self.ws_path)
        };
        let mut url = Url::parse(&format!("{scheme}://{server}{path}")).map_err(|e| {
            ConfigError::ValidationError(format!("invalid presence server address: {e}"))
        })?;
        url.query_pairs_mut().append_pair("apiKey", &self.api_key);
        Ok(url.into())
    }

    /// Full URL of the invite endpoint.
    pub fn invite_url(&self) -> Result<String, ConfigError> {
        let base = match &self.http_endpoint {
            Some(endpoint) => endpoint.trim().trim_end_matches('/').to_string(),
            None => {
                let server = self.server.trim();
                if server.is_empty() {
                    return Err(ConfigError::ValidationError(
                        "presence server address is empty".into(),
                    ));
                }
                let scheme = if self.secure { "https" } else { "http" };
                format!("{scheme}://{server}")
            }
        };

        let url = Url::parse(&format!("{base}{INVITE_PATH}")).map_err(|e| {
            ConfigError::ValidationError(format!("invalid HTTP endpoint: {e}"))
        })?;
        Ok(url.into())
    }
}

impl fmt::Debug for PresenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenceConfig")
            .field("server", &self.server)
            .field("ws_path", &self.ws_path)
            .field("secure", &self.secure)
            .field("api_key", &"<redacted>")
            .field("http_endpoint", &self.http_endpoint)
            .field("keepalive_interval", &self.keepalive_interval)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("connect_timeout", &self.connect_timeout)
            .field("event_channel_capacity", &self.event_channel_capacity)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Change notifications published by the sync task.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    StatusChanged(ConnectionStatus),
    /// A full list replaced the registry.
    VisitorsReplaced {
        count: usize,
    },
    VisitorInserted(Visitor),
    VisitorUpdated(Visitor),
    InviteConfirmed {
        visitor_id: String,
        guest_url: String,
    },
    /// The server confirmed an invite for a visitor we do not know.
    InviteForUnknownVisitor {
        visitor_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server: &str) -> PresenceConfig {
        PresenceConfig {
            server: server.into(),
            api_key: "k&y=1".into(),
            ..PresenceConfig::default()
        }
    }

    #[test]
    fn ws_url_encodes_api_key() {
        let url = config("presence.example.com").ws_url().unwrap();
        assert_eq!(url, "wss://presence.example.com/?apiKey=k%26y%3D1");
    }

    #[test]
    fn ws_url_honours_insecure_and_path() {
        let mut cfg = config("127.0.0.1:8080");
        cfg.secure = false;
        cfg.ws_path = "live".into();
        let url = cfg.ws_url().unwrap();
        assert!(url.starts_with("ws://127.0.0.1:8080/live?apiKey="));
    }

    #[test]
    fn empty_server_is_rejected() {
        assert!(matches!(
            config("  ").ws_url(),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(config("").invite_url().is_err());
    }

    #[test]
    fn invite_url_defaults_to_server() {
        assert_eq!(
            config("presence.example.com").invite_url().unwrap(),
            "https://presence.example.com/api/send-video-invite"
        );
    }

    #[test]
    fn invite_url_override_wins() {
        let mut cfg = config("");
        cfg.http_endpoint = Some("http://localhost:3000/".into());
        assert_eq!(
            cfg.invite_url().unwrap(),
            "http://localhost:3000/api/send-video-invite"
        );
    }

    #[test]
    fn debug_hides_api_key() {
        let debug = format!("{:?}", config("h"));
        assert!(!debug.contains("k&y=1"));
    }
}

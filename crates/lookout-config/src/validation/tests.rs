//! Tests for the full validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    let config = LookoutConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_zero_keepalive() {
    let mut config = LookoutConfig::default();
    config.presence.keepalive_interval_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.keepalive_interval_secs"));
}

#[test]
fn catches_reconnect_delay_too_large() {
    let mut config = LookoutConfig::default();
    config.presence.reconnect_delay_secs = 600;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.reconnect_delay_secs"));
}

#[test]
fn catches_zero_event_capacity() {
    let mut config = LookoutConfig::default();
    config.presence.event_channel_capacity = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.event_channel_capacity"));
}

#[test]
fn catches_relative_ws_path() {
    let mut config = LookoutConfig::default();
    config.presence.ws_path = "ws".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.ws_path"));
}

#[test]
fn catches_scheme_in_server() {
    let mut config = LookoutConfig::default();
    config.presence.server = "wss://presence.example.com".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.server"));
}

#[test]
fn catches_http_endpoint_without_scheme() {
    let mut config = LookoutConfig::default();
    config.presence.http_endpoint = Some("api.example.com".into());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.http_endpoint"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = LookoutConfig::default();
    config.presence.keepalive_interval_secs = 0;
    config.presence.connect_timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.keepalive_interval_secs"));
    assert!(err.contains("presence.connect_timeout_secs"));
}

#[test]
fn accepts_custom_endpoint() {
    let mut config = LookoutConfig::default();
    config.presence.server = "localhost:8080".into();
    config.presence.http_endpoint = Some("http://localhost:3000".into());
    assert!(validate(&config).is_ok());
}

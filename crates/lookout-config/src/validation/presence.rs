//! Presence section validation.

use crate::schema::LookoutConfig;

use super::helpers::validate_range;

pub(super) fn validate_presence(errors: &mut Vec<String>, config: &LookoutConfig) {
    let p = &config.presence;

    validate_range(errors, "presence.keepalive_interval_secs", p.keepalive_interval_secs, 1, 300);
    validate_range(errors, "presence.reconnect_delay_secs", p.reconnect_delay_secs, 1, 60);
    validate_range(errors, "presence.connect_timeout_secs", p.connect_timeout_secs, 1, 120);
    validate_range(errors, "presence.event_channel_capacity", p.event_channel_capacity, 1, 65536);

    if !p.ws_path.starts_with('/') {
        errors.push(format!("presence.ws_path = {:?} must start with '/'", p.ws_path));
    }
    if p.server.contains("://") {
        errors.push(format!(
            "presence.server = {:?} must be a host without a scheme",
            p.server
        ));
    }
    if let Some(endpoint) = &p.http_endpoint {
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            errors.push(format!(
                "presence.http_endpoint = {endpoint:?} must start with http:// or https://"
            ));
        }
    }
}

//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Lookout Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[presence]
# Presence server host and optional port, without a scheme.
server = ""
# ws_path = "/"
# secure = true                  # wss/https when true, ws/http otherwise
api_key = ""
# http_endpoint = "https://api.example.com"   # defaults to the server host
# keepalive_interval_secs = 30   # 1-300
# reconnect_delay_secs = 3       # 1-60
# connect_timeout_secs = 15      # 1-120
# event_channel_capacity = 256   # 1-65536

[logging]
# Used when RUST_LOG is not set: trace, debug, info, warn, error
# level = "info"
"##
    .to_string()
}

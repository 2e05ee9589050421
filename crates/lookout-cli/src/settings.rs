//! Effective settings: config file plus command-line overrides.

use std::path::Path;
use std::time::Duration;

use lookout_common::ConfigError;
use lookout_config::LookoutConfig;

/// Values given on the command line that win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub api_key: Option<String>,
    pub insecure: bool,
}

/// Load the config from `path`, or from the platform default location.
pub fn load(path: Option<&Path>) -> Result<LookoutConfig, ConfigError> {
    match path {
        Some(path) => {
            let config = lookout_config::load_from_path(path)?;
            lookout_config::validation::validate(&config)?;
            Ok(config)
        }
        None => lookout_config::load_config(),
    }
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.server.is_none() && self.api_key.is_none() && !self.insecure
    }
}

pub fn apply_overrides(config: &mut LookoutConfig, overrides: Overrides) {
    if let Some(server) = overrides.server {
        config.presence.server = server;
    }
    if let Some(api_key) = overrides.api_key {
        config.presence.api_key = api_key;
    }
    if overrides.insecure {
        config.presence.secure = false;
    }
}

/// Convert the file representation into the client's runtime config.
pub fn presence_config(config: &LookoutConfig) -> lookout_presence::PresenceConfig {
    let file = &config.presence;
    lookout_presence::PresenceConfig {
        server: file.server.clone(),
        ws_path: file.ws_path.clone(),
        secure: file.secure,
        api_key: file.api_key.clone(),
        http_endpoint: file.http_endpoint.clone(),
        keepalive_interval: Duration::from_secs(file.keepalive_interval_secs.into()),
        reconnect_delay: Duration::from_secs(file.reconnect_delay_secs.into()),
        connect_timeout: Duration::from_secs(file.connect_timeout_secs.into()),
        event_channel_capacity: file.event_channel_capacity as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_file_values() {
        let mut config = LookoutConfig::default();
        config.presence.server = "from-file.example.com".into();
        config.presence.api_key = "file-key".into();

        apply_overrides(
            &mut config,
            Overrides {
                server: Some("localhost:8080".into()),
                api_key: None,
                insecure: true,
            },
        );

        assert_eq!(config.presence.server, "localhost:8080");
        assert_eq!(config.presence.api_key, "file-key");
        assert!(!config.presence.secure);
    }

    #[test]
    fn no_overrides_keep_config() {
        let mut config = LookoutConfig::default();
        apply_overrides(&mut config, Overrides::default());
        assert!(config.presence.secure);
        assert!(config.presence.server.is_empty());
    }

    #[test]
    fn any_flag_makes_overrides_non_empty() {
        assert!(Overrides::default().is_empty());
        assert!(!Overrides {
            insecure: true,
            ..Overrides::default()
        }
        .is_empty());
        assert!(!Overrides {
            api_key: Some("k".into()),
            ..Overrides::default()
        }
        .is_empty());
    }

    #[test]
    fn converts_seconds_to_durations() {
        let mut config = LookoutConfig::default();
        config.presence.server = "presence.example.com".into();
        config.presence.reconnect_delay_secs = 7;

        let runtime = presence_config(&config);
        assert_eq!(runtime.keepalive_interval, Duration::from_secs(30));
        assert_eq!(runtime.reconnect_delay, Duration::from_secs(7));
        assert_eq!(runtime.connect_timeout, Duration::from_secs(15));
        assert_eq!(runtime.event_channel_capacity, 256);
        assert_eq!(
            runtime.ws_url().unwrap(),
            "wss://presence.example.com/?apiKey="
        );
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let result = load(Some(Path::new("/nonexistent/lookout/config.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}

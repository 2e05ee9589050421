//! Lookout configuration system.
//!
//! Provides TOML-based configuration for the presence client and the
//! `lookout` binary. All config sections use sensible defaults so partial
//! configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lookout_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::{LogLevel, LoggingConfig, LookoutConfig, PresenceConfig, CONFIG_SCHEMA_VERSION};
pub use toml_loader::{create_default_config, default_config_path, load_default, load_from_path};
pub use toml_writer::save_config_to_path;

use lookout_common::ConfigError;

/// Convenience function to load config from the platform default path.
///
/// Loads `config.toml` from the OS config directory, creates a default
/// if none exists, and validates the result.
pub fn load_config() -> Result<LookoutConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string with the api key redacted.
pub fn config_to_json(config: &LookoutConfig) -> String {
    let mut redacted = config.clone();
    if !redacted.presence.api_key.is_empty() {
        redacted.presence.api_key = "[REDACTED]".into();
    }
    serde_json::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

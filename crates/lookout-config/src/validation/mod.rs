//! Full configuration validation.
//!
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod presence;

#[cfg(test)]
mod tests;

use crate::schema::LookoutConfig;
use lookout_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &LookoutConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    presence::validate_presence(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

//! Configuration schema types for Lookout.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod presence;

pub use logging::*;
pub use presence::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Lookout.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookoutConfig {
    pub presence: PresenceConfig,
    pub logging: LoggingConfig,
}

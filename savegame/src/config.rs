//! Decoder configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the global list the event-logging script writes to.
pub const DEFAULT_EVENT_LOG_NAME: &str = "$SoHGlobalEvents";

/// Settings for the streaming decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// `name` attribute of the `value` element pointing at the event log list.
    pub event_log_name: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            event_log_name: DEFAULT_EVENT_LOG_NAME.to_string(),
        }
    }
}

impl DecoderConfig {
    /// Parse a config from TOML. Missing fields fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }
}

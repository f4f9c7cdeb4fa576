//! Analyzer configuration, loadable from TOML.
//!
//! ```toml
//! [decoder]
//! event_log_name = "$SoHGlobalEvents"
//!
//! [clustering]
//! max_time_gap_secs = 300.0
//! max_distance = 30000.0
//!
//! [narrative]
//! player_faction = "player"
//! ```

use savegame::{ConfigError, DecoderConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::clustering::ClusterConfig;
use crate::narrative::NarrativeConfig;

/// Settings for every stage of an analysis. Missing sections use defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub decoder: DecoderConfig,
    pub clustering: ClusterConfig,
    pub narrative: NarrativeConfig,
}

impl AnalyzerConfig {
    /// Parse a config from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading analyzer config");
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

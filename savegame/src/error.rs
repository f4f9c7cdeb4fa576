//! Errors that abort a load.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal decode failures. Recoverable problems are reported as
/// [`crate::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open savegame {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read savegame: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed savegame markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("savegame ended with {open_elements} element(s) still open")]
    Truncated { open_elements: usize },
}

/// Failures while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

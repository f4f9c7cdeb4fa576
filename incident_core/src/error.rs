//! Errors surfaced by the analysis pipeline.

use savegame::{ConfigError, DecodeError};
use thiserror::Error;

/// Anything that stops an analysis from producing a result.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

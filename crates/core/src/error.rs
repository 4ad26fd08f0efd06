//! Error types for the dot-reveal core.

use thiserror::Error;

/// Errors produced by engine construction and its host collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A configuration field was rejected at construction time.
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Backing-store dimensions could not be represented.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// The render surface could not be created or bound.
    #[error("render surface error: {0}")]
    Surface(String),

    /// The host refused to schedule a frame.
    #[error("frame scheduler error: {0}")]
    Scheduler(String),

    /// File output failed.
    #[error("i/o error: {0}")]
    Io(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidConfig`].
    pub fn config(field: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

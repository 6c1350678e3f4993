//! Failure kinds shared by the engine, the source reader and the card.

use thiserror::Error;

/// Why a computation could not produce numeric output.
///
/// `InvalidConfiguration` is a setup-time error that blocks activation.
/// `SourceUnavailable` is transient: the sensor publishes an `unavailable`
/// state and recovers on the next source update.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
}

impl EngineError {
    /// Returns `true` for errors that clear on their own once the source recovers.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_))
    }
}

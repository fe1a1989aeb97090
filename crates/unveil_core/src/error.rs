//! Error types shared by the Unveil crates

use thiserror::Error;

/// Configuration and parsing errors.
///
/// Binding operations never return these; they fall back to defaults and log.
/// Strict parsers and configuration loaders do.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Trigger position string could not be parsed
    #[error("invalid trigger position: {0:?}")]
    InvalidTriggerPosition(String),

    /// Easing curve name is not recognised
    #[error("unknown easing curve: {0:?}")]
    UnknownEasing(String),

    /// Animation kind name is not recognised
    #[error("unknown animation kind: {0:?}")]
    UnknownAnimation(String),

    /// A duration, delay or interval was negative or not finite
    #[error("{name} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { name: &'static str, value: f32 },

    /// Selector syntax is not supported
    #[error("unsupported selector: {0:?}")]
    InvalidSelector(String),

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(String),

    /// Configuration file could not be parsed or serialized
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for Unveil operations
pub type Result<T> = std::result::Result<T, Error>;

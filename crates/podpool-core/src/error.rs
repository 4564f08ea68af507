//! Configuration error types.

use thiserror::Error;

/// Result type alias for configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a [`ScalerConfig`](crate::ScalerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("container image must not be empty")]
    EmptyImage,

    #[error("container prefix must not be empty")]
    EmptyPrefix,

    #[error("min_containers ({min}) exceeds max_containers ({max})")]
    InvertedBounds { min: u32, max: u32 },
}

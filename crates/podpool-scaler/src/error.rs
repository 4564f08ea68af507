//! Scaling error taxonomy.

use std::fmt;

use podpool_runtime::RuntimeError;
use thiserror::Error;

/// Result type alias for scaling operations.
pub type ScaleResult<T> = Result<T, ScaleError>;

/// Which configured bound a request ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min => f.write_str("Minimum"),
            Bound::Max => f.write_str("Maximum"),
        }
    }
}

/// Errors that can occur while scaling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScaleError {
    #[error("container runtime not available: {0}")]
    RuntimeUnavailable(String),

    #[error("failed to create container {name}: {reason}")]
    CreateFailed { name: String, reason: String },

    #[error("failed to remove container {name}: {reason}")]
    RemoveFailed { name: String, reason: String },

    #[error("No running containers to remove")]
    NoRunningContainers,

    #[error("{bound} container limit reached ({limit})")]
    LimitReached { bound: Bound, limit: u32, current: u32 },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Count must be between {min} and {max}")]
    OutOfRange { target: i64, min: u32, max: u32 },
}

impl ScaleError {
    /// Whether the request itself was at fault, as opposed to the runtime.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScaleError::LimitReached { .. }
                | ScaleError::InvalidInput(_)
                | ScaleError::OutOfRange { .. }
        )
    }

    /// Running count carried by errors raised after a bound check.
    pub fn current_count(&self) -> Option<u32> {
        match self {
            ScaleError::LimitReached { current, .. } => Some(*current),
            _ => None,
        }
    }

    pub(crate) fn unavailable(err: RuntimeError) -> Self {
        ScaleError::RuntimeUnavailable(match err {
            RuntimeError::Unavailable(reason) => reason,
            other => other.to_string(),
        })
    }

    pub(crate) fn create_failed(name: &str, err: RuntimeError) -> Self {
        match err {
            RuntimeError::Unavailable(reason) => ScaleError::RuntimeUnavailable(reason),
            other => ScaleError::CreateFailed {
                name: name.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub(crate) fn remove_failed(name: &str, err: RuntimeError) -> Self {
        match err {
            RuntimeError::Unavailable(reason) => ScaleError::RuntimeUnavailable(reason),
            other => ScaleError::RemoveFailed {
                name: name.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_messages_name_the_bound() {
        let err = ScaleError::LimitReached {
            bound: Bound::Max,
            limit: 10,
            current: 10,
        };
        assert_eq!(err.to_string(), "Maximum container limit reached (10)");
        assert_eq!(err.current_count(), Some(10));

        let err = ScaleError::LimitReached {
            bound: Bound::Min,
            limit: 1,
            current: 1,
        };
        assert_eq!(err.to_string(), "Minimum container limit reached (1)");
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(ScaleError::InvalidInput("x".into()).is_client_error());
        assert!(
            ScaleError::OutOfRange {
                target: 5,
                min: 1,
                max: 3
            }
            .is_client_error()
        );
        assert!(!ScaleError::NoRunningContainers.is_client_error());
        assert!(!ScaleError::RuntimeUnavailable("down".into()).is_client_error());
    }

    #[test]
    fn unavailable_runtime_maps_to_runtime_unavailable() {
        let err = ScaleError::create_failed("x", RuntimeError::Unavailable("gone".into()));
        assert_eq!(err, ScaleError::RuntimeUnavailable("gone".into()));

        let err = ScaleError::remove_failed("x", RuntimeError::Api("boom".into()));
        assert!(matches!(err, ScaleError::RemoveFailed { .. }));
    }
}

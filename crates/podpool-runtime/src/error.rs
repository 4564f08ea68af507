//! Runtime adapter error types.

use thiserror::Error;

/// Result type alias for runtime adapter calls.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors surfaced by a [`ContainerRuntime`](crate::ContainerRuntime).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("container runtime not available: {0}")]
    Unavailable(String),

    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container runtime error: {0}")]
    Api(String),
}

impl From<bollard::errors::Error> for RuntimeError {
    fn from(e: bollard::errors::Error) -> Self {
        match e {
            bollard::errors::Error::DockerResponseServerError {
                status_code: 404,
                message,
            } => RuntimeError::NotFound(message),
            other => RuntimeError::Api(other.to_string()),
        }
    }
}

//! The runtime capability trait and the shared handle around it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use podpool_core::{LaunchSpec, ManagedContainer};

use crate::error::{RuntimeError, RuntimeResult};

/// The four container operations podpool needs from an engine, plus a
/// liveness check.
///
/// Implementations must be safe for concurrent use: one instance is
/// shared by every in-flight request.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List every container the engine knows about, any status, in the
    /// engine's native order.
    async fn list_containers(&self) -> RuntimeResult<Vec<ManagedContainer>>;

    /// Create and start a detached container.
    async fn run_detached(&self, spec: &LaunchSpec) -> RuntimeResult<ManagedContainer>;

    /// Stop a container, killing it once `grace` has elapsed.
    async fn stop(&self, name: &str, grace: Duration) -> RuntimeResult<()>;

    /// Remove a stopped container permanently.
    async fn remove(&self, name: &str) -> RuntimeResult<()>;

    /// Check that the engine is reachable.
    async fn ping(&self) -> RuntimeResult<()>;
}

/// Process-wide handle to the container runtime.
///
/// Cloning is cheap; every clone shares the same backend.
#[derive(Clone)]
pub enum RuntimeHandle {
    Connected(Arc<dyn ContainerRuntime>),
    Unavailable { reason: String },
}

impl RuntimeHandle {
    pub fn connected(runtime: impl ContainerRuntime + 'static) -> Self {
        Self::Connected(Arc::new(runtime))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Borrow the backend, or fail with [`RuntimeError::Unavailable`].
    pub fn runtime(&self) -> RuntimeResult<&dyn ContainerRuntime> {
        match self {
            Self::Connected(runtime) => Ok(runtime.as_ref()),
            Self::Unavailable { reason } => Err(RuntimeError::Unavailable(reason.clone())),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected(_) => f.write_str("RuntimeHandle::Connected"),
            Self::Unavailable { reason } => f
                .debug_struct("RuntimeHandle::Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

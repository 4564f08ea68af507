//! Container inventory — prefix-filtered reads against the runtime.
//!
//! Nothing is cached; every call lists the runtime again.

use std::sync::Arc;

use podpool_core::{ManagedContainer, ScalerConfig};
use podpool_runtime::{RuntimeHandle, RuntimeResult};
use tracing::error;

/// Outcome of a tolerant inventory read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The runtime answered; these are the prefix-matching containers.
    Live(Vec<ManagedContainer>),
    /// The runtime was unavailable or the query failed. Treated as empty.
    Degraded { reason: String },
}

impl Listing {
    /// The containers, or an empty slice when degraded.
    pub fn containers(&self) -> &[ManagedContainer] {
        match self {
            Listing::Live(containers) => containers,
            Listing::Degraded { .. } => &[],
        }
    }

    /// Running containers, in listing order.
    pub fn running(&self) -> impl Iterator<Item = &ManagedContainer> {
        self.containers().iter().filter(|c| c.is_running())
    }

    pub fn running_count(&self) -> u32 {
        self.running().count() as u32
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Listing::Degraded { .. })
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Listing::Live(_) => None,
            Listing::Degraded { reason } => Some(reason),
        }
    }
}

/// Reads the managed subset of the runtime's containers.
#[derive(Clone)]
pub struct Inventory {
    runtime: RuntimeHandle,
    config: Arc<ScalerConfig>,
}

impl Inventory {
    pub fn new(runtime: RuntimeHandle, config: Arc<ScalerConfig>) -> Self {
        Self { runtime, config }
    }

    pub fn runtime(&self) -> &RuntimeHandle {
        &self.runtime
    }

    /// List prefix-matching containers of any status, surfacing errors.
    pub async fn try_list(&self) -> RuntimeResult<Vec<ManagedContainer>> {
        let runtime = self.runtime.runtime()?;
        let all = runtime.list_containers().await?;
        Ok(all
            .into_iter()
            .filter(|c| self.config.owns(&c.name))
            .collect())
    }

    /// List prefix-matching containers, degrading to an empty listing when
    /// the runtime cannot answer.
    pub async fn list_managed(&self) -> Listing {
        if let RuntimeHandle::Unavailable { reason } = &self.runtime {
            error!(%reason, "runtime unavailable, inventory is empty");
            return Listing::Degraded {
                reason: reason.clone(),
            };
        }

        match self.try_list().await {
            Ok(containers) => Listing::Live(containers),
            Err(e) => {
                error!(error = %e, "error listing containers");
                Listing::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Number of managed containers currently `running`.
    pub async fn count_running(&self) -> u32 {
        self.list_managed().await.running_count()
    }
}

//! Container lifecycle — launching and retiring single managed containers.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use podpool_core::{LaunchSpec, ManagedContainer, ScalerConfig};
use podpool_runtime::RuntimeHandle;
use tracing::{error, info};

use crate::error::{ScaleError, ScaleResult};
use crate::inventory::Inventory;

/// Compose a managed container name: `{prefix}_{ordinal}_{unix_secs}`.
pub fn container_name(prefix: &str, ordinal: usize, unix_secs: u64) -> String {
    format!("{prefix}_{ordinal}_{unix_secs}")
}

/// Creates and removes managed containers one at a time.
#[derive(Clone)]
pub struct Lifecycle {
    runtime: RuntimeHandle,
    config: Arc<ScalerConfig>,
    inventory: Inventory,
}

impl Lifecycle {
    pub fn new(runtime: RuntimeHandle, config: Arc<ScalerConfig>, inventory: Inventory) -> Self {
        Self {
            runtime,
            config,
            inventory,
        }
    }

    /// Launch one detached container from the configured image.
    ///
    /// The ordinal in the name is one more than the number of managed
    /// containers of any status at call time. Concurrent calls can pick
    /// the same ordinal; the timestamp usually keeps names apart.
    pub async fn create(&self) -> ScaleResult<ManagedContainer> {
        let runtime = self.runtime.runtime().map_err(ScaleError::unavailable)?;

        let ordinal = self.inventory.list_managed().await.containers().len() + 1;
        let name = container_name(&self.config.prefix, ordinal, epoch_secs());
        let spec = LaunchSpec::managed(name.as_str(), self.config.image.as_str());

        match runtime.run_detached(&spec).await {
            Ok(container) => {
                info!(container = %container.name, image = %self.config.image, "created container");
                Ok(container)
            }
            Err(e) => {
                error!(container = %name, error = %e, "failed to create container");
                Err(ScaleError::create_failed(&name, e))
            }
        }
    }

    /// Stop and remove one running container, returning its name.
    ///
    /// The victim is the last running entry in the runtime's listing
    /// order. Whether that is the newest container depends on the runtime.
    pub async fn remove(&self) -> ScaleResult<String> {
        let runtime = self.runtime.runtime().map_err(ScaleError::unavailable)?;

        let listing = self.inventory.list_managed().await;
        let victim = listing
            .running()
            .last()
            .ok_or(ScaleError::NoRunningContainers)?
            .name
            .clone();

        let stopped = runtime.stop(&victim, self.config.stop_timeout()).await;
        let removed = match stopped {
            Ok(()) => runtime.remove(&victim).await,
            Err(e) => Err(e),
        };

        match removed {
            Ok(()) => {
                info!(container = %victim, "removed container");
                Ok(victim)
            }
            Err(e) => {
                error!(container = %victim, error = %e, "failed to remove container");
                Err(ScaleError::remove_failed(&victim, e))
            }
        }
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

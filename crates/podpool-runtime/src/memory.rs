//! In-process runtime backend.
//!
//! Keeps containers in insertion order, counts every call, and can be told
//! to fail specific operations. Used by tests throughout the workspace in
//! place of a real engine.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use podpool_core::{ContainerStatus, LaunchSpec, ManagedContainer};

use crate::error::{RuntimeError, RuntimeResult};
use crate::handle::ContainerRuntime;

/// Number of calls made against a [`MemoryRuntime`], per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub lists: usize,
    pub runs: usize,
    pub stops: usize,
    pub removes: usize,
}

impl CallCounts {
    /// Calls that changed engine state.
    pub fn mutations(&self) -> usize {
        self.runs + self.stops + self.removes
    }
}

#[derive(Default)]
struct Faults {
    /// Fail the run call with this 1-based sequence number.
    run_number: Option<usize>,
    stop: bool,
    remove: bool,
    list: bool,
}

#[derive(Default)]
struct Inner {
    containers: Vec<ManagedContainer>,
    calls: CallCounts,
    faults: Faults,
    next_id: u64,
    last_stop_grace: Option<Duration>,
}

/// A [`ContainerRuntime`] that lives entirely in memory.
pub struct MemoryRuntime {
    inner: Mutex<Inner>,
    clock: AtomicI64,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock: AtomicI64::new(1_700_000_000),
        }
    }

    /// Insert a container directly, bypassing the call counters.
    pub fn seed(&self, name: &str, status: ContainerStatus, image: &str) {
        let created = self.tick();
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner.containers.push(ManagedContainer {
            id,
            name: name.to_string(),
            status,
            image: Some(image.to_string()),
            created,
            labels: Default::default(),
        });
    }

    /// Snapshot of the stored containers, in insertion order.
    pub fn containers(&self) -> Vec<ManagedContainer> {
        self.lock().containers.clone()
    }

    pub fn running_names(&self) -> Vec<String> {
        self.lock()
            .containers
            .iter()
            .filter(|c| c.is_running())
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    /// Grace period passed to the most recent `stop` call.
    pub fn last_stop_grace(&self) -> Option<Duration> {
        self.lock().last_stop_grace
    }

    /// Make the `n`th `run_detached` call (counting from 1, including
    /// calls already made) fail.
    pub fn fail_run_number(&self, n: usize) {
        self.lock().faults.run_number = Some(n);
    }

    pub fn fail_stops(&self, fail: bool) {
        self.lock().faults.stop = fail;
    }

    pub fn fail_removes(&self, fail: bool) {
        self.lock().faults.remove = fail;
    }

    pub fn fail_lists(&self, fail: bool) {
        self.lock().faults.list = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn tick(&self) -> i64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl ContainerRuntime for MemoryRuntime {
    async fn list_containers(&self) -> RuntimeResult<Vec<ManagedContainer>> {
        // Suspend once, like an engine round-trip would.
        tokio::task::yield_now().await;

        let mut inner = self.lock();
        inner.calls.lists += 1;
        if inner.faults.list {
            return Err(RuntimeError::Api("list failed (injected)".to_string()));
        }
        Ok(inner.containers.clone())
    }

    async fn run_detached(&self, spec: &LaunchSpec) -> RuntimeResult<ManagedContainer> {
        let created = self.tick();
        let mut inner = self.lock();
        inner.calls.runs += 1;

        if inner.faults.run_number == Some(inner.calls.runs) {
            return Err(RuntimeError::Api(format!(
                "failed to start {} (injected)",
                spec.name
            )));
        }
        if inner.containers.iter().any(|c| c.name == spec.name) {
            return Err(RuntimeError::Api(format!(
                "container name {} is already in use",
                spec.name
            )));
        }

        inner.next_id += 1;
        let container = ManagedContainer {
            id: format!("mem-{}", inner.next_id),
            name: spec.name.clone(),
            status: ContainerStatus::Running,
            image: Some(spec.image.clone()),
            created,
            labels: spec.labels.clone(),
        };
        inner.containers.push(container.clone());
        Ok(container)
    }

    async fn stop(&self, name: &str, grace: Duration) -> RuntimeResult<()> {
        let mut inner = self.lock();
        inner.calls.stops += 1;
        inner.last_stop_grace = Some(grace);
        if inner.faults.stop {
            return Err(RuntimeError::Api(format!("failed to stop {name} (injected)")));
        }
        let container = inner
            .containers
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| RuntimeError::NotFound(name.to_string()))?;
        container.status = ContainerStatus::Exited;
        Ok(())
    }

    async fn remove(&self, name: &str) -> RuntimeResult<()> {
        let mut inner = self.lock();
        inner.calls.removes += 1;
        if inner.faults.remove {
            return Err(RuntimeError::Api(format!(
                "failed to remove {name} (injected)"
            )));
        }
        let index = inner
            .containers
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| RuntimeError::NotFound(name.to_string()))?;
        if inner.containers[index].is_running() {
            return Err(RuntimeError::Api(format!(
                "cannot remove running container {name}"
            )));
        }
        inner.containers.remove(index);
        Ok(())
    }

    async fn ping(&self) -> RuntimeResult<()> {
        Ok(())
    }
}

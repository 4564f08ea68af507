//! Scaler — bound-checked scaling on top of the lifecycle operations.
//!
//! The running count is never stored. Each operation reads it from the
//! inventory, checks it against the configured bounds, mutates, and reads
//! it again for the response.

use std::sync::Arc;

use podpool_core::{ContainerSummary, ScalerConfig};
use podpool_runtime::RuntimeHandle;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Bound, ScaleError, ScaleResult};
use crate::inventory::Inventory;
use crate::lifecycle::Lifecycle;

/// Result of a successful [`Scaler::scale_up`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleUpOutcome {
    pub container_name: String,
    pub previous_count: u32,
    pub current_count: u32,
}

/// Result of a successful [`Scaler::scale_down`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleDownOutcome {
    pub removed_container: String,
    pub previous_count: u32,
    pub current_count: u32,
}

/// Result of a successful [`Scaler::scale_to`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleToOutcome {
    pub target: u32,
    pub previous_count: u32,
    pub current_count: u32,
    pub created: Vec<String>,
    pub removed: Vec<String>,
}

/// What startup reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub previous_count: u32,
    pub created: Vec<String>,
    /// The error that stopped the top-up early, if any.
    pub error: Option<ScaleError>,
}

/// Snapshot of the pool for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub total_containers: usize,
    pub running_containers: u32,
    pub min_containers: u32,
    pub max_containers: u32,
    pub container_image: String,
    pub containers: Vec<ContainerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_error: Option<String>,
}

/// Interpret the `count` field of a scale-to request.
///
/// Accepts integers, floats (truncated toward zero) and strings holding an
/// integer. A missing or `null` field is reported separately.
pub fn parse_target(raw: Option<&Value>) -> ScaleResult<i64> {
    let invalid = |v: &Value| ScaleError::InvalidInput(format!("Invalid 'count' parameter: {v}"));

    match raw {
        None | Some(Value::Null) => Err(ScaleError::InvalidInput(
            "Missing 'count' parameter".to_string(),
        )),
        Some(v @ Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite())
                && f.trunc() >= i64::MIN as f64
                && f.trunc() <= i64::MAX as f64
            {
                Ok(f.trunc() as i64)
            } else {
                Err(invalid(v))
            }
        }
        Some(v @ Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}

/// Scales the pool of managed containers within `[min, max]`.
#[derive(Clone)]
pub struct Scaler {
    config: Arc<ScalerConfig>,
    inventory: Inventory,
    lifecycle: Lifecycle,
}

impl Scaler {
    pub fn new(runtime: RuntimeHandle, config: Arc<ScalerConfig>) -> Self {
        let inventory = Inventory::new(runtime.clone(), config.clone());
        let lifecycle = Lifecycle::new(runtime, config.clone(), inventory.clone());
        Self {
            config,
            inventory,
            lifecycle,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn runtime_connected(&self) -> bool {
        self.inventory.runtime().is_connected()
    }

    /// Add one container unless the pool is already at its maximum.
    pub async fn scale_up(&self) -> ScaleResult<ScaleUpOutcome> {
        let current = self.inventory.count_running().await;
        let max = self.config.max_containers;
        if current >= max {
            debug!(current, max, "scale up refused at maximum");
            return Err(ScaleError::LimitReached {
                bound: Bound::Max,
                limit: max,
                current,
            });
        }

        let container = self.lifecycle.create().await?;
        let new_count = self.inventory.count_running().await;
        info!(previous = current, current = new_count, container = %container.name, "scaled up");

        Ok(ScaleUpOutcome {
            container_name: container.name,
            previous_count: current,
            current_count: new_count,
        })
    }

    /// Remove one container unless the pool is already at its minimum.
    pub async fn scale_down(&self) -> ScaleResult<ScaleDownOutcome> {
        let current = self.inventory.count_running().await;
        let min = self.config.min_containers;
        if current <= min {
            debug!(current, min, "scale down refused at minimum");
            return Err(ScaleError::LimitReached {
                bound: Bound::Min,
                limit: min,
                current,
            });
        }

        let removed = self.lifecycle.remove().await?;
        let new_count = self.inventory.count_running().await;
        info!(previous = current, current = new_count, container = %removed, "scaled down");

        Ok(ScaleDownOutcome {
            removed_container: removed,
            previous_count: current,
            current_count: new_count,
        })
    }

    /// Create or remove containers until `target` are running.
    ///
    /// Steps run one after another. If one fails, the steps already taken
    /// stay in place and the failing step's error is returned.
    pub async fn scale_to(&self, target: i64) -> ScaleResult<ScaleToOutcome> {
        let min = self.config.min_containers;
        let max = self.config.max_containers;
        if target < i64::from(min) || target > i64::from(max) {
            return Err(ScaleError::OutOfRange { target, min, max });
        }
        let target = target as u32;

        let current = self.inventory.count_running().await;
        let delta = i64::from(target) - i64::from(current);

        let mut created = Vec::new();
        let mut removed = Vec::new();

        if delta > 0 {
            for step in 0..delta {
                match self.lifecycle.create().await {
                    Ok(container) => created.push(container.name),
                    Err(e) => {
                        warn!(target, completed = step, requested = delta, error = %e, "scale to target aborted");
                        return Err(e);
                    }
                }
            }
        } else if delta < 0 {
            let steps = delta.unsigned_abs();
            for step in 0..steps {
                match self.lifecycle.remove().await {
                    Ok(name) => removed.push(name),
                    Err(e) => {
                        warn!(target, completed = step, requested = steps, error = %e, "scale to target aborted");
                        return Err(e);
                    }
                }
            }
        } else {
            debug!(target, "already at target, no scaling needed");
        }

        let new_count = self.inventory.count_running().await;
        info!(previous = current, current = new_count, target, "scaled to target");

        Ok(ScaleToOutcome {
            target,
            previous_count: current,
            current_count: new_count,
            created,
            removed,
        })
    }

    /// Top the pool up to its minimum before serving traffic.
    ///
    /// Stops at the first failure, logging it; never returns an error.
    pub async fn reconcile_startup(&self) -> StartupReport {
        let current = self.inventory.count_running().await;
        let min = self.config.min_containers;
        let mut report = StartupReport {
            previous_count: current,
            created: Vec::new(),
            error: None,
        };

        if current >= min {
            debug!(current, min, "pool already at minimum");
            return report;
        }

        let missing = min - current;
        info!(count = missing, "starting initial containers");
        for _ in 0..missing {
            match self.lifecycle.create().await {
                Ok(container) => report.created.push(container.name),
                Err(e) => {
                    warn!(error = %e, created = report.created.len(), "failed to start initial containers");
                    report.error = Some(e);
                    break;
                }
            }
        }
        report
    }

    /// Describe every managed container plus the configured bounds.
    pub async fn status(&self) -> StatusReport {
        let listing = self.inventory.list_managed().await;
        StatusReport {
            total_containers: listing.containers().len(),
            running_containers: listing.running_count(),
            min_containers: self.config.min_containers,
            max_containers: self.config.max_containers,
            container_image: self.config.image.clone(),
            containers: listing.containers().iter().map(|c| c.summary()).collect(),
            inventory_error: listing.degraded_reason().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podpool_core::ContainerStatus;
    use podpool_runtime::{CallCounts, MemoryRuntime};
    use serde_json::json;

    fn scaler_with(memory: Arc<MemoryRuntime>, min: u32, max: u32) -> Scaler {
        let config = ScalerConfig {
            min_containers: min,
            max_containers: max,
            ..ScalerConfig::default()
        };
        Scaler::new(RuntimeHandle::Connected(memory), Arc::new(config))
    }

    fn seed_running(memory: &MemoryRuntime, n: usize) {
        for i in 1..=n {
            memory.seed(
                &format!("scaled_app_{i}_{i}"),
                ContainerStatus::Running,
                "nginx:alpine",
            );
        }
    }

    // ── scale_up ───────────────────────────────────────────────────

    #[tokio::test]
    async fn scale_up_adds_exactly_one() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 1);
        let scaler = scaler_with(memory.clone(), 1, 3);

        let outcome = scaler.scale_up().await.unwrap();
        assert_eq!(outcome.previous_count, 1);
        assert_eq!(outcome.current_count, 2);
        assert!(outcome.container_name.starts_with("scaled_app_2_"));
        assert_eq!(memory.calls().runs, 1);
    }

    #[tokio::test]
    async fn scale_up_at_or_above_max_does_nothing() {
        for running in [3, 4] {
            let memory = Arc::new(MemoryRuntime::new());
            seed_running(&memory, running);
            let scaler = scaler_with(memory.clone(), 1, 3);

            let err = scaler.scale_up().await.unwrap_err();
            assert_eq!(
                err,
                ScaleError::LimitReached {
                    bound: Bound::Max,
                    limit: 3,
                    current: running as u32,
                }
            );
            assert_eq!(memory.calls().mutations(), 0);
        }
    }

    #[tokio::test]
    async fn scale_up_without_runtime_fails_unavailable() {
        let config = Arc::new(ScalerConfig::default());
        let scaler = Scaler::new(RuntimeHandle::unavailable("down"), config);

        assert!(!scaler.runtime_connected());
        assert!(matches!(
            scaler.scale_up().await,
            Err(ScaleError::RuntimeUnavailable(_))
        ));
    }

    // ── scale_down ─────────────────────────────────────────────────

    #[tokio::test]
    async fn scale_down_removes_exactly_one() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 3);
        let scaler = scaler_with(memory.clone(), 1, 5);

        let outcome = scaler.scale_down().await.unwrap();
        assert_eq!(outcome.previous_count, 3);
        assert_eq!(outcome.current_count, 2);
        assert_eq!(outcome.removed_container, "scaled_app_3_3");
    }

    #[tokio::test]
    async fn scale_down_at_or_below_min_does_nothing() {
        for running in [0, 1] {
            let memory = Arc::new(MemoryRuntime::new());
            seed_running(&memory, running);
            let scaler = scaler_with(memory.clone(), 1, 3);

            let err = scaler.scale_down().await.unwrap_err();
            assert_eq!(err.current_count(), Some(running as u32));
            assert!(matches!(
                err,
                ScaleError::LimitReached {
                    bound: Bound::Min,
                    limit: 1,
                    ..
                }
            ));
            assert_eq!(memory.calls().mutations(), 0);
        }
    }

    #[tokio::test]
    async fn scale_down_without_runtime_hits_min_first() {
        let config = Arc::new(ScalerConfig::default());
        let scaler = Scaler::new(RuntimeHandle::unavailable("down"), config);

        let err = scaler.scale_down().await.unwrap_err();
        assert_eq!(err.current_count(), Some(0));
    }

    // ── scale_to ───────────────────────────────────────────────────

    #[tokio::test]
    async fn scale_to_out_of_range_touches_nothing() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 2);
        let scaler = scaler_with(memory.clone(), 1, 3);

        for target in [0, 5, -1] {
            let err = scaler.scale_to(target).await.unwrap_err();
            assert_eq!(err, ScaleError::OutOfRange { target, min: 1, max: 3 });
        }
        assert_eq!(memory.calls(), CallCounts::default());
    }

    #[tokio::test]
    async fn scale_to_current_is_a_no_op() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 2);
        let scaler = scaler_with(memory.clone(), 1, 3);

        let outcome = scaler.scale_to(2).await.unwrap();
        assert_eq!(outcome.previous_count, 2);
        assert_eq!(outcome.current_count, 2);
        assert!(outcome.created.is_empty() && outcome.removed.is_empty());
        assert_eq!(memory.calls().mutations(), 0);
    }

    #[tokio::test]
    async fn scale_to_higher_creates_the_difference() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 1);
        let scaler = scaler_with(memory.clone(), 1, 10);

        let outcome = scaler.scale_to(4).await.unwrap();
        assert_eq!(outcome.created.len(), 3);
        assert_eq!(outcome.current_count, 4);
        assert_eq!(memory.calls().runs, 3);
        assert_eq!(memory.calls().removes, 0);
    }

    #[tokio::test]
    async fn scale_to_lower_removes_the_difference() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 5);
        let scaler = scaler_with(memory.clone(), 1, 10);

        let outcome = scaler.scale_to(2).await.unwrap();
        assert_eq!(outcome.removed, vec!["scaled_app_5_5", "scaled_app_4_4", "scaled_app_3_3"]);
        assert_eq!(outcome.current_count, 2);
        assert_eq!(memory.calls().removes, 3);
        assert_eq!(memory.calls().runs, 0);
    }

    #[tokio::test]
    async fn scale_to_keeps_partial_progress_on_failure() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 1);
        memory.fail_run_number(3);
        let scaler = scaler_with(memory.clone(), 1, 10);

        let err = scaler.scale_to(5).await.unwrap_err();
        assert!(matches!(err, ScaleError::CreateFailed { .. }));
        // Two creates landed before the third failed; nothing was undone.
        assert_eq!(memory.running_names().len(), 3);
        assert_eq!(memory.calls().runs, 3);
        assert_eq!(memory.calls().removes, 0);
    }

    // ── startup ────────────────────────────────────────────────────

    #[tokio::test]
    async fn startup_tops_up_to_min() {
        let memory = Arc::new(MemoryRuntime::new());
        let scaler = scaler_with(memory.clone(), 2, 5);

        let report = scaler.reconcile_startup().await;
        assert_eq!(report.previous_count, 0);
        assert_eq!(report.created.len(), 2);
        assert!(report.error.is_none());
        assert_eq!(scaler.inventory().count_running().await, 2);
    }

    #[tokio::test]
    async fn startup_at_min_creates_nothing() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 3);
        let scaler = scaler_with(memory.clone(), 2, 5);

        let report = scaler.reconcile_startup().await;
        assert!(report.created.is_empty());
        assert_eq!(memory.calls().runs, 0);
    }

    #[tokio::test]
    async fn startup_failure_is_reported_not_raised() {
        let scaler = Scaler::new(
            RuntimeHandle::unavailable("down"),
            Arc::new(ScalerConfig::default()),
        );

        let report = scaler.reconcile_startup().await;
        assert!(report.created.is_empty());
        assert_eq!(
            report.error,
            Some(ScaleError::RuntimeUnavailable("down".to_string()))
        );
    }

    // ── status ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn status_lists_every_managed_container() {
        let memory = Arc::new(MemoryRuntime::new());
        seed_running(&memory, 2);
        memory.seed("scaled_app_9_9", ContainerStatus::Exited, "nginx:alpine");
        memory.seed("other", ContainerStatus::Running, "redis");
        let scaler = scaler_with(memory, 1, 3);

        let status = scaler.status().await;
        assert_eq!(status.total_containers, 3);
        assert_eq!(status.running_containers, 2);
        assert_eq!(status.min_containers, 1);
        assert_eq!(status.max_containers, 3);
        assert_eq!(status.container_image, "nginx:alpine");
        assert_eq!(status.containers[2].status, "exited");
        assert_eq!(status.inventory_error, None);
    }

    #[tokio::test]
    async fn status_flags_degraded_inventory() {
        let memory = Arc::new(MemoryRuntime::new());
        memory.fail_lists(true);
        let scaler = scaler_with(memory, 1, 3);

        let status = scaler.status().await;
        assert_eq!(status.total_containers, 0);
        assert!(status.inventory_error.is_some());
    }

    // ── parse_target ───────────────────────────────────────────────

    #[test]
    fn parse_target_accepts_numeric_forms() {
        assert_eq!(parse_target(Some(&json!(3))).unwrap(), 3);
        assert_eq!(parse_target(Some(&json!(-2))).unwrap(), -2);
        assert_eq!(parse_target(Some(&json!(2.9))).unwrap(), 2);
        assert_eq!(parse_target(Some(&json!(" 7 "))).unwrap(), 7);
    }

    #[test]
    fn parse_target_rejects_missing_and_garbage() {
        assert_eq!(
            parse_target(None).unwrap_err(),
            ScaleError::InvalidInput("Missing 'count' parameter".to_string())
        );
        assert!(matches!(
            parse_target(Some(&Value::Null)),
            Err(ScaleError::InvalidInput(_))
        ));
        for bad in [json!("five"), json!(true), json!([1]), json!({"n": 1})] {
            assert!(matches!(
                parse_target(Some(&bad)),
                Err(ScaleError::InvalidInput(_))
            ));
        }
    }
}

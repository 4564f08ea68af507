//! Domain types shared by the runtime adapter, the scaler, and the API.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label key stamped on every container podpool launches.
pub const MANAGED_BY_LABEL: &str = "managed_by";

/// Value of [`MANAGED_BY_LABEL`] identifying podpool-owned containers.
pub const MANAGED_BY_VALUE: &str = "auto_scaler";

/// Placeholder reported when the runtime omits a container's image.
pub const UNKNOWN_IMAGE: &str = "unknown";

// ── Status ─────────────────────────────────────────────────────────

/// Runtime-reported container state.
///
/// Only [`ContainerStatus::Running`] affects scaling decisions; the rest
/// are carried through for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerStatus {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    Other(String),
}

impl ContainerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Restarting => "restarting",
            Self::Removing => "removing",
            Self::Exited => "exited",
            Self::Dead => "dead",
            Self::Other(s) => s,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<&str> for ContainerStatus {
    fn from(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "exited" => Self::Exited,
            "dead" => Self::Dead,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ContainerStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ContainerStatus> for String {
    fn from(status: ContainerStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Container ──────────────────────────────────────────────────────

/// A container as reported by the runtime. Owned by the runtime; podpool
/// only observes and mutates it through the adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedContainer {
    /// Runtime-assigned identifier.
    pub id: String,
    /// Container name, without any leading `/`.
    pub name: String,
    pub status: ContainerStatus,
    /// Image reference, if the runtime reported one.
    pub image: Option<String>,
    /// Unix timestamp (seconds) of creation as reported by the runtime.
    pub created: i64,
    pub labels: HashMap<String, String>,
}

impl ManagedContainer {
    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Whether the container carries podpool's ownership label.
    pub fn is_labelled(&self) -> bool {
        self.labels
            .get(MANAGED_BY_LABEL)
            .is_some_and(|v| v == MANAGED_BY_VALUE)
    }

    /// Creation time as RFC 3339, or the raw number if out of range.
    pub fn created_rfc3339(&self) -> String {
        chrono::DateTime::from_timestamp(self.created, 0)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| self.created.to_string())
    }

    /// Summary used by the status endpoint.
    pub fn summary(&self) -> ContainerSummary {
        ContainerSummary {
            name: self.name.clone(),
            status: self.status.to_string(),
            image: self
                .image
                .clone()
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| UNKNOWN_IMAGE.to_string()),
            created: self.created_rfc3339(),
        }
    }
}

/// Reporting view of a managed container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerSummary {
    pub name: String,
    pub status: String,
    pub image: String,
    pub created: String,
}

// ── Launch ─────────────────────────────────────────────────────────

/// Everything the runtime needs to start one detached container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub name: String,
    pub image: String,
    pub labels: HashMap<String, String>,
}

impl LaunchSpec {
    /// A launch spec carrying podpool's ownership label.
    pub fn managed(name: impl Into<String>, image: impl Into<String>) -> Self {
        let labels = HashMap::from([(
            MANAGED_BY_LABEL.to_string(),
            MANAGED_BY_VALUE.to_string(),
        )]);
        Self {
            name: name.into(),
            image: image.into(),
            labels,
        }
    }
}

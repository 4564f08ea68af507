//! Scaler configuration.
//!
//! A `ScalerConfig` is built once at startup (defaults, then an optional
//! TOML file, then flag/env overrides applied by the daemon) and shared
//! read-only with every component afterwards.
//!
//! ```toml
//! image = "nginx:alpine"
//! prefix = "scaled_app"
//! min_containers = 1
//! max_containers = 10
//! stop_timeout_secs = 10
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_IMAGE: &str = "nginx:alpine";
pub const DEFAULT_PREFIX: &str = "scaled_app";
pub const DEFAULT_MIN_CONTAINERS: u32 = 1;
pub const DEFAULT_MAX_CONTAINERS: u32 = 10;
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 10;

/// Immutable settings for one pool of homogeneous containers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScalerConfig {
    /// Image reference every managed container is launched from.
    pub image: String,
    /// Name prefix identifying managed containers.
    pub prefix: String,
    /// Lower bound on running containers.
    pub min_containers: u32,
    /// Upper bound on running containers.
    pub max_containers: u32,
    /// Grace period given to a container on stop before it is killed.
    pub stop_timeout_secs: u64,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            min_containers: DEFAULT_MIN_CONTAINERS,
            max_containers: DEFAULT_MAX_CONTAINERS,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
        }
    }
}

impl ScalerConfig {
    /// Load a config from a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Check the invariants the scaler relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.image.trim().is_empty() {
            return Err(ConfigError::EmptyImage);
        }
        if self.prefix.trim().is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.min_containers > self.max_containers {
            return Err(ConfigError::InvertedBounds {
                min: self.min_containers,
                max: self.max_containers,
            });
        }
        Ok(())
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// Whether `name` belongs to this pool.
    pub fn owns(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

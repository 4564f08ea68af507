//! podpool-core — shared types for the podpool container scaler.
//!
//! Holds the process-wide [`ScalerConfig`], the [`ManagedContainer`]
//! record observed from the container runtime, and the ownership label
//! stamped on every container podpool launches.

pub mod config;
pub mod error;
pub mod types;

pub use config::ScalerConfig;
pub use error::{ConfigError, ConfigResult};
pub use types::*;

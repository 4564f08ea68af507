//! podpool-runtime — the container runtime adapter.
//!
//! The scaler never talks to a container engine directly. It goes through
//! a [`RuntimeHandle`], which is either connected to a [`ContainerRuntime`]
//! or explicitly unavailable.
//!
//! # Backends
//!
//! ```text
//! ContainerRuntime
//!   ├── DockerRuntime  (Docker Engine API via bollard)
//!   └── MemoryRuntime  (in-process, call-counting, fault injection)
//! ```
//!
//! The handle is established once at startup. If the engine cannot be
//! reached the daemon keeps running with `RuntimeHandle::Unavailable`:
//! reads come back empty and every mutation fails.

pub mod docker;
pub mod error;
pub mod handle;
pub mod memory;

pub use docker::DockerRuntime;
pub use error::{RuntimeError, RuntimeResult};
pub use handle::{ContainerRuntime, RuntimeHandle};
pub use memory::{CallCounts, MemoryRuntime};

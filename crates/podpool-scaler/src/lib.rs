//! podpool-scaler — scaling a pool of homogeneous containers.
//!
//! Three layers, each re-querying the runtime on every call:
//!
//! ```text
//! Scaler (bound checks, delta arithmetic)
//!   ├── Lifecycle (create: name + launch, remove: pick + stop + remove)
//!   │     └── Inventory
//!   └── Inventory (prefix-filtered listing, running count)
//!         └── RuntimeHandle
//! ```
//!
//! # Scaling rules
//!
//! ```text
//! scale_up:    current >= max  → LimitReached(max), else one create
//! scale_down:  current <= min  → LimitReached(min), else one remove
//! scale_to(t): t ∉ [min, max]  → OutOfRange
//!              delta = t - current
//!              delta > 0 → delta creates, delta < 0 → |delta| removes
//! startup:     current < min   → (min - current) creates, failures logged
//! ```
//!
//! Nothing here is serialized: two concurrent calls can both pass the
//! same bound check. Multi-step operations are not rolled back when a
//! step fails.

pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod reconciler;

pub use error::{Bound, ScaleError, ScaleResult};
pub use inventory::{Inventory, Listing};
pub use lifecycle::{Lifecycle, container_name};
pub use reconciler::{
    ScaleDownOutcome, ScaleToOutcome, ScaleUpOutcome, Scaler, StartupReport, StatusReport,
    parse_target,
};

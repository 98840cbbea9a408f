// ── Resource storage layer ──
//
// Named eventually consistent maps, the registry that hands them out, and
// the JSON snapshot used to carry state between processes.

mod map;
mod snapshot;
mod storage;
mod timestamp;

pub use map::{EventuallyConsistentMap, ResourceStore, Versioned};
pub use snapshot::{InventorySnapshot, SNAPSHOT_VERSION};
pub use storage::{EventuallyConsistentMapBuilder, StorageService};
pub use timestamp::{Timestamp, TimestampProvider, WallClock, wall_clock_provider};

use thiserror::Error;

/// Faults raised by the storage layer itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named store was destroyed and can no longer be used.
    #[error("store '{name}' is unavailable: it has been destroyed")]
    Destroyed { name: String },

    /// A builder was asked to build without a name.
    #[error("a {what} must be given a name before it is built")]
    MissingName { what: &'static str },

    /// A store with this name already exists with different key or value
    /// types.
    #[error("store '{name}' already exists with a different key or value type")]
    TypeMismatch { name: String },
}

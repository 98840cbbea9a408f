//! Tenant network resource inventory.
//!
//! This crate holds the authoritative record of SDN tenant resources and
//! enforces referential integrity between them before a mutation is
//! committed:
//!
//! - **[`TenantNetworkManager`]**, **[`SubnetManager`]** and
//!   **[`VirtualPortManager`]** — CRUD managers over one resource type each.
//!   Subnets and ports are validated against the network inventory through
//!   the [`DependencyLookup`] seam before they are written.
//!
//! - **[`EventuallyConsistentMap`]** — the store behind every manager. A
//!   `DashMap` keyed by resource id whose entries carry a [`Timestamp`];
//!   concurrent writes to the same key converge by last-writer-wins.
//!
//! - **[`StorageService`]** — builds named stores and named
//!   [`AsyncAtomicCounter`]s. Building the same name twice returns the same
//!   shared instance.
//!
//! - **[`Inventory`]** — facade wiring storage, the three managers and the
//!   optional on-disk [`InventorySnapshot`] behind explicit `open()` /
//!   `close()` calls.
//!
//! Batch mutations are deliberately non-transactional: a batch `create`
//! stops at the first record whose reference is missing and keeps what it
//! already wrote.

pub mod config;
pub mod counter;
pub mod error;
pub mod inventory;
pub mod manager;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::InventoryConfig;
pub use counter::{
    AsyncAtomicCounter, AtomicCounterBuilder, DEFAULT_INCREMENT_TIMEOUT, IncrementOutcome,
    PendingIncrement,
};
pub use error::CoreError;
pub use inventory::Inventory;
pub use manager::{
    DependencyLookup, PortFilter, Resource, ResourceManager, SubnetManager, TenantNetworkManager,
    UpdatePolicy, VirtualPortManager,
};
pub use store::{
    EventuallyConsistentMap, EventuallyConsistentMapBuilder, InventorySnapshot, ResourceStore,
    StorageService, StoreError, Timestamp, TimestampProvider, Versioned,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AllocationPool, AllowedAddressPair, DeviceId, FixedIp, HostRoute, IpPrefix, IpVersion,
    MacAddress, NetworkState, NetworkType, ParseError, PhysicalNetwork, PortState,
    SecurityGroupId, SegmentationId, Subnet, SubnetId, TenantId, TenantNetwork, TenantNetworkId,
    VirtualPort, VirtualPortId,
};

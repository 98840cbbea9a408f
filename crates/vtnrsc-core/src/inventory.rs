// ── Inventory facade ──
//
// Wires one storage service, the three managers and the counter registry
// together, and owns their shared lifecycle: snapshot in on `open()`,
// snapshot out on `close()`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::InventoryConfig;
use crate::counter::{AsyncAtomicCounter, IncrementOutcome};
use crate::error::CoreError;
use crate::manager::{ResourceManager, SubnetManager, TenantNetworkManager, VirtualPortManager};
use crate::store::{InventorySnapshot, StorageService};

// ── Inventory ────────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<InventoryInner>`. Construction wires
/// everything up but does not load state; call [`open()`](Self::open)
/// before use and [`close()`](Self::close) to persist.
#[derive(Clone)]
pub struct Inventory {
    inner: Arc<InventoryInner>,
}

struct InventoryInner {
    config: InventoryConfig,
    storage: StorageService,
    networks: Arc<TenantNetworkManager>,
    subnets: SubnetManager,
    ports: VirtualPortManager,
    open: AtomicBool,
}

impl Inventory {
    pub fn new(config: InventoryConfig) -> Result<Self, CoreError> {
        let storage = StorageService::new();
        let networks = Arc::new(TenantNetworkManager::from_storage(&storage)?);
        let subnets = SubnetManager::from_storage(&storage, networks.clone())?
            .with_update_policy(config.update_policy);
        let ports = VirtualPortManager::from_storage(&storage, networks.clone())?
            .with_update_policy(config.update_policy);

        Ok(Self {
            inner: Arc::new(InventoryInner {
                config,
                storage,
                networks,
                subnets,
                ports,
                open: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.inner.config
    }

    pub fn storage(&self) -> &StorageService {
        &self.inner.storage
    }

    pub fn networks(&self) -> &TenantNetworkManager {
        &self.inner.networks
    }

    pub fn subnets(&self) -> &SubnetManager {
        &self.inner.subnets
    }

    pub fn ports(&self) -> &VirtualPortManager {
        &self.inner.ports
    }

    pub fn is_open(&self) -> bool {
        self.inner.open.load(Ordering::Acquire)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Open every manager, then load the configured snapshot if one
    /// exists. Opening twice is a no-op.
    ///
    /// The inventory only counts as open once the snapshot is in. If
    /// loading fails the managers are closed again, so a later `close()`
    /// cannot overwrite the snapshot with an empty inventory.
    pub fn open(&self) -> Result<(), CoreError> {
        if self.is_open() {
            return Ok(());
        }
        if let Err(e) = self.open_managers().and_then(|()| self.load_snapshot()) {
            self.close_managers();
            return Err(e);
        }
        self.inner.open.store(true, Ordering::Release);
        info!("inventory opened");
        Ok(())
    }

    fn open_managers(&self) -> Result<(), CoreError> {
        self.inner.networks.open()?;
        self.inner.subnets.open()?;
        self.inner.ports.open()
    }

    fn load_snapshot(&self) -> Result<(), CoreError> {
        let Some(path) = &self.inner.config.snapshot_path else {
            return Ok(());
        };
        match InventorySnapshot::load(path)? {
            Some(snapshot) => self.restore(snapshot),
            None => {
                debug!(path = %path.display(), "no snapshot, starting empty");
                Ok(())
            }
        }
    }

    /// Reverse dependency order.
    fn close_managers(&self) {
        self.inner.ports.close();
        self.inner.subnets.close();
        self.inner.networks.close();
    }

    /// Save the snapshot (if configured), then close every manager in
    /// reverse dependency order. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), CoreError> {
        if !self.is_open() {
            return Ok(());
        }
        let saved = match &self.inner.config.snapshot_path {
            Some(path) => self.snapshot().and_then(|s| s.save(path)),
            None => Ok(()),
        };

        self.inner.open.store(false, Ordering::Release);
        self.close_managers();
        info!("inventory closed");
        saved
    }

    // ── Snapshots ────────────────────────────────────────────────

    /// Point-in-time image of every live record and replicated counter.
    /// Records are sorted by id so the file diffs cleanly.
    pub fn snapshot(&self) -> Result<InventorySnapshot, CoreError> {
        let mut snapshot = InventorySnapshot::new();
        snapshot.networks = self.inner.networks.get_all()?;
        snapshot.networks.sort_by(|a, b| a.id.cmp(&b.id));
        snapshot.subnets = self.inner.subnets.get_all()?;
        snapshot.subnets.sort_by(|a, b| a.id.cmp(&b.id));
        snapshot.ports = self.inner.ports.get_all()?;
        snapshot.ports.sort_by(|a, b| a.id.cmp(&b.id));
        snapshot.counters = self.inner.storage.replicated_counter_values();
        Ok(snapshot)
    }

    /// Load a snapshot on top of the current state. References are not
    /// re-validated: a snapshot may legitimately hold orphans.
    pub fn restore(&self, snapshot: InventorySnapshot) -> Result<(), CoreError> {
        let InventorySnapshot {
            networks,
            subnets,
            ports,
            counters,
            ..
        } = snapshot;
        debug!(
            networks = networks.len(),
            subnets = subnets.len(),
            ports = ports.len(),
            counters = counters.len(),
            "restoring snapshot"
        );
        self.inner.networks.try_create(networks)?;
        self.inner.subnets.load(subnets)?;
        self.inner.ports.load(ports)?;
        for (name, value) in counters {
            self.inner.storage.restore_counter(&name, value);
        }
        Ok(())
    }

    // ── Counters ─────────────────────────────────────────────────

    /// The replicated counter `name`, or its in-memory twin.
    pub fn counter(&self, name: &str, in_memory: bool) -> Result<AsyncAtomicCounter, CoreError> {
        let builder = self.inner.storage.atomic_counter_builder().with_name(name);
        let builder = if in_memory {
            builder.with_partitions_disabled()
        } else {
            builder
        };
        Ok(builder.build_async_counter()?)
    }

    /// Increment `name`, waiting at most the configured counter timeout.
    pub async fn increment_counter(
        &self,
        name: &str,
        in_memory: bool,
        cancel: &CancellationToken,
    ) -> Result<IncrementOutcome, CoreError> {
        let counter = self.counter(name, in_memory)?;
        Ok(counter
            .increment_with_timeout(self.inner.config.counter_timeout, cancel)
            .await)
    }
}

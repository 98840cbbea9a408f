// ── Tenant network inventory ──

use std::sync::Arc;

use super::{Collection, DependencyLookup, ResourceManager, unchecked};
use crate::error::CoreError;
use crate::model::{TenantNetwork, TenantNetworkId};
use crate::store::{ResourceStore, StorageService};

/// Owns the network inventory. Networks reference nothing, so every create
/// and update is accepted.
pub struct TenantNetworkManager {
    networks: Collection<TenantNetwork>,
}

impl TenantNetworkManager {
    pub const STORE_NAME: &'static str = "all_network";

    pub fn new(store: Arc<dyn ResourceStore<TenantNetworkId, TenantNetwork>>) -> Self {
        Self {
            networks: Collection::new("tenant network manager", store),
        }
    }

    /// Build over the shared `all_network` store.
    pub fn from_storage(storage: &StorageService) -> Result<Self, CoreError> {
        Ok(Self {
            networks: Collection::from_storage(
                "tenant network manager",
                storage,
                Self::STORE_NAME,
            )?,
        })
    }
}

impl ResourceManager for TenantNetworkManager {
    type Record = TenantNetwork;

    fn open(&self) -> Result<(), CoreError> {
        self.networks.open()
    }

    fn close(&self) {
        self.networks.close();
    }

    fn exists(&self, id: &TenantNetworkId) -> Result<bool, CoreError> {
        self.networks.exists(id)
    }

    fn get(&self, id: &TenantNetworkId) -> Result<Option<TenantNetwork>, CoreError> {
        self.networks.get(id)
    }

    fn get_all(&self) -> Result<Vec<TenantNetwork>, CoreError> {
        self.networks.get_all()
    }

    fn count(&self) -> Result<usize, CoreError> {
        self.networks.count()
    }

    fn try_create(&self, records: Vec<TenantNetwork>) -> Result<(), CoreError> {
        self.networks.write_all(records, unchecked)
    }

    fn try_update(&self, records: Vec<TenantNetwork>) -> Result<(), CoreError> {
        self.networks.write_all(records, unchecked)
    }

    fn remove(&self, ids: &[TenantNetworkId]) -> Result<bool, CoreError> {
        self.networks.remove_all(ids)?;
        Ok(true)
    }
}

impl DependencyLookup<TenantNetworkId> for TenantNetworkManager {
    fn exists(&self, id: &TenantNetworkId) -> Result<bool, CoreError> {
        self.networks.exists(id)
    }
}

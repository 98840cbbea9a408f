// ── Virtual port inventory ──

use std::sync::Arc;

use tracing::debug;

use super::{
    Collection, Dangling, DependencyLookup, ResourceManager, UpdatePolicy, check_network,
    unchecked,
};
use crate::error::CoreError;
use crate::model::{DeviceId, TenantId, TenantNetworkId, VirtualPort, VirtualPortId};
use crate::store::{ResourceStore, StorageService};

/// Read-side selection over the port inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PortFilter {
    #[default]
    All,
    Network(TenantNetworkId),
    Tenant(TenantId),
    Device(DeviceId),
}

impl PortFilter {
    pub fn matches(&self, port: &VirtualPort) -> bool {
        match self {
            Self::All => true,
            Self::Network(id) => &port.network_id == id,
            Self::Tenant(id) => &port.tenant_id == id,
            Self::Device(id) => &port.device_id == id,
        }
    }
}

/// Owns the virtual port inventory. A port must name an existing network
/// when it is created.
pub struct VirtualPortManager {
    ports: Collection<VirtualPort>,
    networks: Arc<dyn DependencyLookup<TenantNetworkId>>,
    update_policy: UpdatePolicy,
}

impl VirtualPortManager {
    pub const STORE_NAME: &'static str = "all_virtual_port";

    pub fn new(
        store: Arc<dyn ResourceStore<VirtualPortId, VirtualPort>>,
        networks: Arc<dyn DependencyLookup<TenantNetworkId>>,
    ) -> Self {
        Self {
            ports: Collection::new("virtual port manager", store),
            networks,
            update_policy: UpdatePolicy::default(),
        }
    }

    /// Build over the shared `all_virtual_port` store.
    pub fn from_storage(
        storage: &StorageService,
        networks: Arc<dyn DependencyLookup<TenantNetworkId>>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            ports: Collection::from_storage("virtual port manager", storage, Self::STORE_NAME)?,
            networks,
            update_policy: UpdatePolicy::default(),
        })
    }

    #[must_use]
    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// Linear scan of the whole inventory.
    pub fn get_ports(&self, filter: &PortFilter) -> Result<Vec<VirtualPort>, CoreError> {
        Ok(self
            .ports
            .get_all()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }

    pub fn get_ports_by_network(&self, id: &TenantNetworkId) -> Result<Vec<VirtualPort>, CoreError> {
        self.get_ports(&PortFilter::Network(id.clone()))
    }

    pub fn get_ports_by_tenant(&self, id: &TenantId) -> Result<Vec<VirtualPort>, CoreError> {
        self.get_ports(&PortFilter::Tenant(id.clone()))
    }

    pub fn get_ports_by_device(&self, id: &DeviceId) -> Result<Vec<VirtualPort>, CoreError> {
        self.get_ports(&PortFilter::Device(id.clone()))
    }

    /// Write records without reference checks, e.g. when restoring a
    /// snapshot that legitimately holds orphans.
    pub(crate) fn load(&self, records: Vec<VirtualPort>) -> Result<(), CoreError> {
        self.ports.write_all(records, unchecked)
    }

    fn check(&self, port: &VirtualPort) -> Result<Option<Dangling>, CoreError> {
        let dangling = check_network(self.networks.as_ref(), &port.network_id)?;
        if dangling.is_some() {
            debug!(port = %port.id, network = %port.network_id, "network not found");
        }
        Ok(dangling)
    }
}

impl ResourceManager for VirtualPortManager {
    type Record = VirtualPort;

    fn open(&self) -> Result<(), CoreError> {
        self.ports.open()
    }

    fn close(&self) {
        self.ports.close();
    }

    fn exists(&self, id: &VirtualPortId) -> Result<bool, CoreError> {
        self.ports.exists(id)
    }

    fn get(&self, id: &VirtualPortId) -> Result<Option<VirtualPort>, CoreError> {
        self.ports.get(id)
    }

    fn get_all(&self) -> Result<Vec<VirtualPort>, CoreError> {
        self.ports.get_all()
    }

    fn count(&self) -> Result<usize, CoreError> {
        self.ports.count()
    }

    fn try_create(&self, records: Vec<VirtualPort>) -> Result<(), CoreError> {
        self.ports.write_all(records, |p| self.check(p))
    }

    fn try_update(&self, records: Vec<VirtualPort>) -> Result<(), CoreError> {
        match self.update_policy {
            UpdatePolicy::Unchecked => self.ports.write_all(records, unchecked),
            UpdatePolicy::ValidateReferences => self.ports.write_all(records, |p| self.check(p)),
        }
    }

    fn remove(&self, ids: &[VirtualPortId]) -> Result<bool, CoreError> {
        self.ports.remove_all(ids)?;
        Ok(true)
    }
}

// ── Subnet inventory ──

use std::sync::Arc;

use tracing::debug;

use super::{
    Collection, DependencyLookup, ResourceManager, UpdatePolicy, check_network, unchecked,
};
use crate::error::CoreError;
use crate::model::{Subnet, SubnetId, TenantNetworkId};
use crate::store::{ResourceStore, StorageService};

/// Owns the subnet inventory. Every subnet must name an existing network
/// when it is created.
pub struct SubnetManager {
    subnets: Collection<Subnet>,
    networks: Arc<dyn DependencyLookup<TenantNetworkId>>,
    update_policy: UpdatePolicy,
}

impl SubnetManager {
    pub const STORE_NAME: &'static str = "all_subnet";

    pub fn new(
        store: Arc<dyn ResourceStore<SubnetId, Subnet>>,
        networks: Arc<dyn DependencyLookup<TenantNetworkId>>,
    ) -> Self {
        Self {
            subnets: Collection::new("subnet manager", store),
            networks,
            update_policy: UpdatePolicy::default(),
        }
    }

    /// Build over the shared `all_subnet` store.
    pub fn from_storage(
        storage: &StorageService,
        networks: Arc<dyn DependencyLookup<TenantNetworkId>>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            subnets: Collection::from_storage("subnet manager", storage, Self::STORE_NAME)?,
            networks,
            update_policy: UpdatePolicy::default(),
        })
    }

    #[must_use]
    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// Subnets carved out of `network_id`.
    pub fn get_by_network(&self, network_id: &TenantNetworkId) -> Result<Vec<Subnet>, CoreError> {
        Ok(self
            .subnets
            .get_all()?
            .into_iter()
            .filter(|s| &s.network_id == network_id)
            .collect())
    }

    /// Write records without reference checks, e.g. when restoring a
    /// snapshot that legitimately holds orphans.
    pub(crate) fn load(&self, records: Vec<Subnet>) -> Result<(), CoreError> {
        self.subnets.write_all(records, unchecked)
    }

    fn check(&self, subnet: &Subnet) -> Result<Option<super::Dangling>, CoreError> {
        let dangling = check_network(self.networks.as_ref(), &subnet.network_id)?;
        if dangling.is_some() {
            debug!(subnet = %subnet.id, network = %subnet.network_id, "network not found");
        }
        Ok(dangling)
    }
}

impl ResourceManager for SubnetManager {
    type Record = Subnet;

    fn open(&self) -> Result<(), CoreError> {
        self.subnets.open()
    }

    fn close(&self) {
        self.subnets.close();
    }

    fn exists(&self, id: &SubnetId) -> Result<bool, CoreError> {
        self.subnets.exists(id)
    }

    fn get(&self, id: &SubnetId) -> Result<Option<Subnet>, CoreError> {
        self.subnets.get(id)
    }

    fn get_all(&self) -> Result<Vec<Subnet>, CoreError> {
        self.subnets.get_all()
    }

    fn count(&self) -> Result<usize, CoreError> {
        self.subnets.count()
    }

    fn try_create(&self, records: Vec<Subnet>) -> Result<(), CoreError> {
        self.subnets.write_all(records, |s| self.check(s))
    }

    fn try_update(&self, records: Vec<Subnet>) -> Result<(), CoreError> {
        match self.update_policy {
            UpdatePolicy::Unchecked => self.subnets.write_all(records, unchecked),
            UpdatePolicy::ValidateReferences => self.subnets.write_all(records, |s| self.check(s)),
        }
    }

    fn remove(&self, ids: &[SubnetId]) -> Result<bool, CoreError> {
        self.subnets.remove_all(ids)?;
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::manager::TenantNetworkManager;
    use crate::manager::test_support::managers;
    use crate::model::TenantNetwork;

    fn subnet(id: &str, network: &str) -> Subnet {
        Subnet::new(id, network, "tenant-a", "10.0.0.0/24".parse().unwrap())
    }

    #[test]
    fn create_under_existing_network() {
        let (networks, subnets, _) = managers();
        assert!(
            networks
                .create(vec![TenantNetwork::new("net-1", "blue", "tenant-a")])
                .unwrap()
        );
        let s1 = subnet("sub-1", "net-1");
        assert!(subnets.create(vec![s1.clone()]).unwrap());
        assert!(subnets.exists(&"sub-1".into()).unwrap());
        assert_eq!(subnets.get(&"sub-1".into()).unwrap(), Some(s1));
    }

    #[test]
    fn create_under_missing_network_is_rejected() {
        let (_, subnets, _) = managers();
        assert!(!subnets.create(vec![subnet("sub-2", "net-404")]).unwrap());
        assert!(!subnets.exists(&"sub-2".into()).unwrap());
        assert_eq!(subnets.get(&"sub-2".into()).unwrap(), None);
    }

    #[test]
    fn batch_is_fail_fast_and_keeps_earlier_writes() {
        let (networks, subnets, _) = managers();
        networks
            .create(vec![TenantNetwork::new("net-1", "blue", "tenant-a")])
            .unwrap();

        let batch = vec![
            subnet("sub-a", "net-1"),
            subnet("sub-b", "net-404"),
            subnet("sub-c", "net-1"),
        ];
        assert!(!subnets.create(batch).unwrap());
        assert!(subnets.exists(&"sub-a".into()).unwrap());
        assert!(!subnets.exists(&"sub-b".into()).unwrap());
        assert!(!subnets.exists(&"sub-c".into()).unwrap());
    }

    #[test]
    fn try_create_reports_the_reason() {
        let (networks, subnets, _) = managers();
        networks
            .create(vec![TenantNetwork::new("net-1", "blue", "tenant-a")])
            .unwrap();

        let err = subnets
            .try_create(vec![subnet("sub-a", "net-1"), subnet("sub-b", "net-404")])
            .unwrap_err();
        match err {
            CoreError::MissingReference {
                id,
                referenced_id,
                written,
                ..
            } => {
                assert_eq!(id, "sub-b");
                assert_eq!(referenced_id, "net-404");
                assert_eq!(written, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn update_does_not_revalidate_by_default() {
        let (_, subnets, _) = managers();
        assert!(subnets.update(vec![subnet("sub-x", "net-404")]).unwrap());
        assert!(subnets.exists(&"sub-x".into()).unwrap());
    }

    #[test]
    fn strict_update_policy_checks_references() {
        let storage = StorageService::new();
        let networks = Arc::new(TenantNetworkManager::from_storage(&storage).unwrap());
        networks.open().unwrap();
        let subnets = SubnetManager::from_storage(&storage, networks)
            .unwrap()
            .with_update_policy(UpdatePolicy::ValidateReferences);
        subnets.open().unwrap();

        assert!(!subnets.update(vec![subnet("sub-x", "net-404")]).unwrap());
        assert_eq!(subnets.count().unwrap(), 0);
    }

    #[test]
    fn removing_a_network_does_not_cascade() {
        let (networks, subnets, _) = managers();
        networks
            .create(vec![TenantNetwork::new("net-1", "blue", "tenant-a")])
            .unwrap();
        subnets.create(vec![subnet("sub-1", "net-1")]).unwrap();

        networks.remove(&["net-1".into()]).unwrap();
        assert!(subnets.exists(&"sub-1".into()).unwrap());
        assert_eq!(subnets.get_by_network(&"net-1".into()).unwrap().len(), 1);
    }

    #[test]
    fn remove_absent_subnet_is_noop() {
        let (_, subnets, _) = managers();
        assert!(subnets.remove(&["sub-404".into()]).unwrap());
    }
}

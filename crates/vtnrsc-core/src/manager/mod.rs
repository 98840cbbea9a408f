// ── Inventory managers ──
//
// One manager per resource type. Each owns a named store and, where the
// resource carries a foreign key, a lookup into the manager that owns the
// referenced type. Validation happens before a record is written; nothing
// is ever rolled back.

mod network;
mod port;
mod subnet;

pub use network::TenantNetworkManager;
pub use port::{PortFilter, VirtualPortManager};
pub use subnet::SubnetManager;

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::error::CoreError;
use crate::model::{Subnet, SubnetId, TenantNetwork, TenantNetworkId, VirtualPort, VirtualPortId};
use crate::store::{ResourceStore, StorageService, StoreError};

// ── Seams ───────────────────────────────────────────────────────────

/// Answers "does a resource with this id exist?" for a manager that has to
/// validate a foreign key against another manager's inventory.
pub trait DependencyLookup<Id>: Send + Sync {
    fn exists(&self, id: &Id) -> Result<bool, CoreError>;
}

/// Whether `update` re-checks foreign keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Overwrite by key without validation.
    #[default]
    Unchecked,
    /// Apply the same fail-fast reference check as `create`.
    ValidateReferences,
}

/// A storable inventory record.
pub trait Resource: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Display + Send + Sync + 'static;

    /// Human-readable type name used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
}

impl Resource for TenantNetwork {
    type Id = TenantNetworkId;
    const KIND: &'static str = "network";

    fn id(&self) -> &TenantNetworkId {
        &self.id
    }
}

impl Resource for Subnet {
    type Id = SubnetId;
    const KIND: &'static str = "subnet";

    fn id(&self) -> &SubnetId {
        &self.id
    }
}

impl Resource for VirtualPort {
    type Id = VirtualPortId;
    const KIND: &'static str = "virtual port";

    fn id(&self) -> &VirtualPortId {
        &self.id
    }
}

/// CRUD surface shared by every manager.
///
/// `create`/`update`/`remove` are the boolean boundary: `Ok(false)` means a
/// record was rejected by validation, `Err` means the store itself failed.
/// `try_create`/`try_update` return the rejection reason instead.
pub trait ResourceManager: Send + Sync {
    type Record: Resource;

    /// Start serving. A manager built over a [`StorageService`] can be
    /// reopened after `close`; it comes back with a fresh, empty store.
    fn open(&self) -> Result<(), CoreError>;
    fn close(&self);

    fn exists(&self, id: &<Self::Record as Resource>::Id) -> Result<bool, CoreError>;
    fn get(&self, id: &<Self::Record as Resource>::Id) -> Result<Option<Self::Record>, CoreError>;
    /// Unordered point-in-time snapshot.
    fn get_all(&self) -> Result<Vec<Self::Record>, CoreError>;
    fn count(&self) -> Result<usize, CoreError>;

    /// Write each record in order, stopping at the first one that fails
    /// validation. Records written before it stay written.
    fn try_create(&self, records: Vec<Self::Record>) -> Result<(), CoreError>;
    /// Overwrite by id. A record whose id is unknown is inserted.
    fn try_update(&self, records: Vec<Self::Record>) -> Result<(), CoreError>;
    /// Absent ids are ignored.
    fn remove(&self, ids: &[<Self::Record as Resource>::Id]) -> Result<bool, CoreError>;

    fn create(&self, records: Vec<Self::Record>) -> Result<bool, CoreError> {
        accepted(self.try_create(records))
    }

    fn update(&self, records: Vec<Self::Record>) -> Result<bool, CoreError> {
        accepted(self.try_update(records))
    }
}

/// Fold a validation rejection into `Ok(false)`; keep real faults as `Err`.
fn accepted(result: Result<(), CoreError>) -> Result<bool, CoreError> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_validation_failure() => {
            warn!(error = %e, "mutation rejected");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

// ── Shared collection plumbing ──────────────────────────────────────

/// A foreign key that did not resolve.
pub(crate) struct Dangling {
    pub(crate) kind: &'static str,
    pub(crate) id: String,
}

/// Check a network foreign key through `lookup`.
pub(crate) fn check_network(
    lookup: &dyn DependencyLookup<TenantNetworkId>,
    network_id: &TenantNetworkId,
) -> Result<Option<Dangling>, CoreError> {
    Ok((!lookup.exists(network_id)?).then(|| Dangling {
        kind: TenantNetwork::KIND,
        id: network_id.to_string(),
    }))
}

type StoreHandle<R> = Arc<dyn ResourceStore<<R as Resource>::Id, R>>;
type StoreSource<R> = Box<dyn Fn() -> Result<StoreHandle<R>, StoreError> + Send + Sync>;

/// The store behind one manager plus its open/closed state.
pub(crate) struct Collection<R: Resource> {
    component: &'static str,
    store: RwLock<StoreHandle<R>>,
    /// Rebuilds the store after a close. `None` when the store was handed
    /// in directly.
    source: Option<StoreSource<R>>,
    open: AtomicBool,
    released: AtomicBool,
}

impl<R: Resource> Collection<R> {
    pub(crate) fn new(component: &'static str, store: StoreHandle<R>) -> Self {
        Self {
            component,
            store: RwLock::new(store),
            source: None,
            open: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }
    }

    /// Use the store registered as `name`, and the same name again
    /// whenever the collection is reopened.
    pub(crate) fn from_storage(
        component: &'static str,
        storage: &StorageService,
        name: &'static str,
    ) -> Result<Self, CoreError> {
        let storage = storage.clone();
        let source: StoreSource<R> = Box::new(move || {
            let store = storage
                .eventually_consistent_map_builder::<R::Id, R>()
                .with_name(name)
                .build()?;
            Ok(store as StoreHandle<R>)
        });
        let mut collection = Self::new(component, source()?);
        collection.source = Some(source);
        Ok(collection)
    }

    pub(crate) fn open(&self) -> Result<(), CoreError> {
        if self.open.load(Ordering::Acquire) {
            return Ok(());
        }
        if self.released.load(Ordering::Acquire) {
            let Some(source) = &self.source else {
                return Err(StoreError::Destroyed {
                    name: self.current().name().to_owned(),
                }
                .into());
            };
            let fresh = source()?;
            *self.store.write().unwrap_or_else(PoisonError::into_inner) = fresh;
            self.released.store(false, Ordering::Release);
        }
        if !self.open.swap(true, Ordering::AcqRel) {
            let store = self.current();
            info!(component = self.component, store = store.name(), "Started");
        }
        Ok(())
    }

    /// Marks the manager closed and releases its store.
    pub(crate) fn close(&self) {
        if self.open.swap(false, Ordering::AcqRel) {
            self.current().destroy();
            self.released.store(true, Ordering::Release);
            info!(component = self.component, "Stopped");
        }
    }

    fn current(&self) -> StoreHandle<R> {
        Arc::clone(&self.store.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn live(&self) -> Result<StoreHandle<R>, CoreError> {
        if self.open.load(Ordering::Acquire) {
            Ok(self.current())
        } else {
            Err(CoreError::NotOpen {
                component: self.component,
            })
        }
    }

    pub(crate) fn exists(&self, id: &R::Id) -> Result<bool, CoreError> {
        Ok(self.live()?.contains_key(id)?)
    }

    pub(crate) fn get(&self, id: &R::Id) -> Result<Option<R>, CoreError> {
        Ok(self.live()?.get(id)?)
    }

    pub(crate) fn get_all(&self) -> Result<Vec<R>, CoreError> {
        Ok(self.live()?.values()?)
    }

    pub(crate) fn count(&self) -> Result<usize, CoreError> {
        Ok(self.live()?.len()?)
    }

    /// Fail-fast, non-transactional batch write. `check` returns the first
    /// dangling reference of a record, if any.
    pub(crate) fn write_all<F>(&self, records: Vec<R>, check: F) -> Result<(), CoreError>
    where
        F: Fn(&R) -> Result<Option<Dangling>, CoreError>,
    {
        let store = self.live()?;
        for (written, record) in records.into_iter().enumerate() {
            if let Some(dangling) = check(&record)? {
                return Err(CoreError::MissingReference {
                    kind: R::KIND,
                    id: record.id().to_string(),
                    referenced_kind: dangling.kind,
                    referenced_id: dangling.id,
                    written,
                });
            }
            store.put(record.id().clone(), record)?;
        }
        Ok(())
    }

    pub(crate) fn remove_all(&self, ids: &[R::Id]) -> Result<(), CoreError> {
        let store = self.live()?;
        for id in ids {
            store.remove(id)?;
        }
        Ok(())
    }
}

/// No-op check for records without foreign keys.
pub(crate) fn unchecked<R>(_: &R) -> Result<Option<Dangling>, CoreError> {
    Ok(None)
}

// ── Storage service ──
//
// Registry of named stores and named counters. Within one process this is
// what makes a store "shared": every component that builds `all_subnet`
// gets the same map.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use tracing::debug;

use super::StoreError;
use super::map::EventuallyConsistentMap;
use super::timestamp::{TimestampProvider, wall_clock_provider};
use crate::counter::AtomicCounterBuilder;

type SharedMap = Arc<dyn Any + Send + Sync>;

/// Builds and hands out named stores and counters.
///
/// Cheap to clone: clones share one registry, so a manager can keep a
/// handle and rebuild its store after the old one was destroyed.
#[derive(Clone, Default)]
pub struct StorageService {
    inner: Arc<Registry>,
}

#[derive(Default)]
struct Registry {
    maps: DashMap<String, SharedMap>,
    replicated_counters: DashMap<String, Arc<AtomicI64>>,
    local_counters: DashMap<String, Arc<AtomicI64>>,
}

impl StorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eventually_consistent_map_builder<K, V>(&self) -> EventuallyConsistentMapBuilder<'_, K, V> {
        EventuallyConsistentMapBuilder {
            service: self,
            name: None,
            timestamps: None,
            _types: PhantomData,
        }
    }

    pub fn atomic_counter_builder(&self) -> AtomicCounterBuilder<'_> {
        AtomicCounterBuilder::new(self)
    }

    /// Names of every store built so far.
    pub fn map_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.maps.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    // ── Counter cells ────────────────────────────────────────────────

    /// The shared cell behind a named counter. Replicated and in-memory
    /// counters live in separate namespaces, so the same name in the two
    /// modes never aliases.
    pub(crate) fn counter_cell(&self, name: &str, replicated: bool) -> Arc<AtomicI64> {
        let cells = if replicated {
            &self.inner.replicated_counters
        } else {
            &self.inner.local_counters
        };
        Arc::clone(
            cells
                .entry(name.to_owned())
                .or_insert_with(|| Arc::new(AtomicI64::new(0)))
                .value(),
        )
    }

    /// Current values of every replicated counter, for persistence.
    /// In-memory counters are never included.
    pub fn replicated_counter_values(&self) -> BTreeMap<String, i64> {
        self.inner
            .replicated_counters
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::SeqCst)))
            .collect()
    }

    /// Seed a replicated counter, e.g. from a snapshot.
    pub fn restore_counter(&self, name: &str, value: i64) {
        self.counter_cell(name, true).store(value, Ordering::SeqCst);
    }
}

impl fmt::Debug for StorageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageService")
            .field("maps", &self.map_names())
            .field("replicated_counters", &self.inner.replicated_counters.len())
            .field("local_counters", &self.inner.local_counters.len())
            .finish()
    }
}

// ── Map builder ─────────────────────────────────────────────────────

/// Fluent builder returned by
/// [`StorageService::eventually_consistent_map_builder`].
pub struct EventuallyConsistentMapBuilder<'a, K, V> {
    service: &'a StorageService,
    name: Option<String>,
    timestamps: Option<TimestampProvider<K, V>>,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> EventuallyConsistentMapBuilder<'_, K, V>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Defaults to [`wall_clock_provider`] when not set.
    #[must_use]
    pub fn with_timestamp_provider(mut self, timestamps: TimestampProvider<K, V>) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    /// Return the store registered under the builder's name, creating it
    /// if it does not exist yet (or was destroyed).
    pub fn build(self) -> Result<Arc<EventuallyConsistentMap<K, V>>, StoreError> {
        let Self {
            service,
            name,
            timestamps,
            ..
        } = self;
        let name = name.ok_or(StoreError::MissingName {
            what: "eventually consistent map",
        })?;

        let fresh = |timestamps: Option<TimestampProvider<K, V>>| {
            Arc::new(EventuallyConsistentMap::<K, V>::new(
                name.clone(),
                timestamps.unwrap_or_else(wall_clock_provider),
            ))
        };

        let mut timestamps = timestamps;
        let mut slot = service
            .inner
            .maps
            .entry(name.clone())
            .or_insert_with(|| {
                debug!(store = %name, "store created");
                fresh(timestamps.take()) as SharedMap
            });

        let existing = Arc::clone(slot.value())
            .downcast::<EventuallyConsistentMap<K, V>>()
            .map_err(|_| StoreError::TypeMismatch { name: name.clone() })?;

        // A timestamp provider only takes effect when the store is created.
        if existing.is_destroyed() {
            let map = fresh(timestamps);
            *slot.value_mut() = Arc::clone(&map) as SharedMap;
            debug!(store = %name, "destroyed store recreated");
            return Ok(map);
        }
        Ok(existing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::store::{ResourceStore, Timestamp};

    #[test]
    fn same_name_shares_one_store() {
        let storage = StorageService::new();
        let a = storage
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("all_subnet")
            .build()
            .unwrap();
        let b = storage
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("all_subnet")
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        a.put("k".into(), 7).unwrap();
        assert_eq!(b.get(&"k".into()).unwrap(), Some(7));
        assert_eq!(storage.map_names(), vec!["all_subnet".to_owned()]);
    }

    #[test]
    fn build_requires_a_name() {
        let storage = StorageService::new();
        let err = storage
            .eventually_consistent_map_builder::<String, u32>()
            .build()
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingName { .. }));
    }

    #[test]
    fn conflicting_types_are_rejected() {
        let storage = StorageService::new();
        storage
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("shared")
            .build()
            .unwrap();
        let err = storage
            .eventually_consistent_map_builder::<String, String>()
            .with_name("shared")
            .build()
            .unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
    }

    #[test]
    fn custom_provider_is_used() {
        let storage = StorageService::new();
        let map = storage
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("fixed")
            .with_timestamp_provider(Arc::new(|_, _| Timestamp::new(42, 0)))
            .build()
            .unwrap();
        map.put("k".into(), 1).unwrap();
        assert_eq!(map.timestamp_of(&"k".into()), Some(Timestamp::new(42, 0)));
    }

    #[test]
    fn rebuilding_a_destroyed_store_starts_fresh() {
        let storage = StorageService::new();
        let first = storage
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("gone")
            .build()
            .unwrap();
        first.put("k".into(), 1).unwrap();
        first.destroy();

        let second = storage
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("gone")
            .build()
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.is_empty().unwrap());
    }

    #[test]
    fn clones_share_one_registry() {
        let storage = StorageService::new();
        let handle = storage.clone();
        let map = handle
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("all_network")
            .build()
            .unwrap();
        map.put("k".into(), 3).unwrap();

        let again = storage
            .eventually_consistent_map_builder::<String, u32>()
            .with_name("all_network")
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(&map, &again));
        handle.restore_counter("c1", 4);
        assert_eq!(storage.replicated_counter_values().get("c1"), Some(&4));
    }

    #[test]
    fn counter_namespaces_are_separate() {
        let storage = StorageService::new();
        storage.counter_cell("c1", true).fetch_add(5, Ordering::SeqCst);
        assert_eq!(storage.counter_cell("c1", false).load(Ordering::SeqCst), 0);

        storage.restore_counter("c2", 9);
        let values = storage.replicated_counter_values();
        assert_eq!(values.get("c1"), Some(&5));
        assert_eq!(values.get("c2"), Some(&9));
        assert_eq!(values.len(), 2);
    }
}

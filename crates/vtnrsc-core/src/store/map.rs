// ── Eventually consistent resource map ──
//
// Concurrent storage with O(1) lookups and per-key last-writer-wins
// conflict resolution. Removals leave tombstones so a stale replicated
// write cannot resurrect a deleted key.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::StoreError;
use super::timestamp::{Timestamp, TimestampProvider};

/// The operations every inventory manager needs from its backing store.
///
/// Reads are point-in-time: `values()` is an unordered snapshot that may
/// interleave with concurrent writes to other keys.
pub trait ResourceStore<K, V>: Send + Sync {
    fn name(&self) -> &str;
    fn get(&self, key: &K) -> Result<Option<V>, StoreError>;
    fn put(&self, key: K, value: V) -> Result<(), StoreError>;
    /// Idempotent: removing an absent key succeeds.
    fn remove(&self, key: &K) -> Result<(), StoreError>;
    fn contains_key(&self, key: &K) -> Result<bool, StoreError>;
    fn values(&self) -> Result<Vec<V>, StoreError>;
    fn len(&self) -> Result<usize, StoreError>;
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
    /// Release the store. Every later operation fails with
    /// [`StoreError::Destroyed`].
    fn destroy(&self);
}

/// A stamped entry: a live value, or a tombstone (`value: None`).
///
/// This is also the unit exchanged between replicas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<V> {
    pub value: Option<V>,
    pub timestamp: Timestamp,
}

impl<V> Versioned<V> {
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }
}

/// In-process eventually consistent map.
///
/// Thread-safe without external locking: `DashMap` shards the key space
/// and the compare-then-replace of each write happens under the shard's
/// entry lock, so two writers to the same key always converge on the
/// higher timestamp.
pub struct EventuallyConsistentMap<K, V>
where
    K: Eq + Hash,
{
    name: String,
    entries: DashMap<K, Versioned<V>>,
    timestamps: TimestampProvider<K, V>,
    destroyed: AtomicBool,
}

impl<K, V> EventuallyConsistentMap<K, V>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(name: impl Into<String>, timestamps: TimestampProvider<K, V>) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            timestamps,
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Apply an update received from another replica. Returns `true` if it
    /// won (its timestamp is newer than the local entry's), `false` if the
    /// local entry is kept.
    pub fn merge(&self, key: K, update: Versioned<V>) -> Result<bool, StoreError> {
        self.ensure_live()?;
        let applied = self.apply(key.clone(), update);
        if !applied {
            trace!(store = %self.name, key = %key, "stale update ignored");
        }
        Ok(applied)
    }

    /// Every entry including tombstones, for shipping to another replica.
    pub fn export(&self) -> Result<Vec<(K, Versioned<V>)>, StoreError> {
        self.ensure_live()?;
        Ok(self
            .entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect())
    }

    /// Timestamp of the entry currently held for `key`, live or tombstone.
    pub fn timestamp_of(&self, key: &K) -> Option<Timestamp> {
        self.entries.get(key).map(|r| r.value().timestamp)
    }

    /// Drop tombstones stamped before `cutoff` and return how many went.
    ///
    /// Tombstones are otherwise kept forever. Purge only past the point
    /// every replica has seen the removal, or a stale write for that key
    /// can come back.
    pub fn purge_tombstones(&self, cutoff: Timestamp) -> Result<usize, StoreError> {
        self.ensure_live()?;
        let mut purged = 0;
        self.entries.retain(|_, entry| {
            let expired = entry.is_tombstone() && cutoff.is_newer_than(&entry.timestamp);
            if expired {
                purged += 1;
            }
            !expired
        });
        if purged > 0 {
            debug!(store = %self.name, purged, "tombstones purged");
        }
        Ok(purged)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn ensure_live(&self) -> Result<(), StoreError> {
        if self.is_destroyed() {
            return Err(StoreError::Destroyed {
                name: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Last-writer-wins insert. Returns whether `update` replaced the entry.
    fn apply(&self, key: K, update: Versioned<V>) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if update.timestamp.is_newer_than(&occupied.get().timestamp) {
                    occupied.insert(update);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(update);
                true
            }
        }
    }
}

impl<K, V> fmt::Debug for EventuallyConsistentMap<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventuallyConsistentMap")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .field("destroyed", &self.destroyed.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl<K, V> ResourceStore<K, V> for EventuallyConsistentMap<K, V>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync,
    V: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &K) -> Result<Option<V>, StoreError> {
        self.ensure_live()?;
        Ok(self.entries.get(key).and_then(|r| r.value().value.clone()))
    }

    fn put(&self, key: K, value: V) -> Result<(), StoreError> {
        self.ensure_live()?;
        let timestamp = (self.timestamps)(&key, Some(&value));
        let label = key.to_string();
        if self.apply(
            key,
            Versioned {
                value: Some(value),
                timestamp,
            },
        ) {
            debug!(store = %self.name, key = %label, "put");
        } else {
            debug!(store = %self.name, key = %label, "put superseded by newer entry");
        }
        Ok(())
    }

    fn remove(&self, key: &K) -> Result<(), StoreError> {
        self.ensure_live()?;
        let timestamp = (self.timestamps)(key, None);
        if self.apply(
            key.clone(),
            Versioned {
                value: None,
                timestamp,
            },
        ) {
            debug!(store = %self.name, key = %key, "remove");
        }
        Ok(())
    }

    fn contains_key(&self, key: &K) -> Result<bool, StoreError> {
        self.ensure_live()?;
        Ok(self
            .entries
            .get(key)
            .is_some_and(|r| !r.value().is_tombstone()))
    }

    fn values(&self) -> Result<Vec<V>, StoreError> {
        self.ensure_live()?;
        Ok(self
            .entries
            .iter()
            .filter_map(|r| r.value().value.clone())
            .collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        self.ensure_live()?;
        Ok(self
            .entries
            .iter()
            .filter(|r| !r.value().is_tombstone())
            .count())
    }

    fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            self.entries.clear();
            debug!(store = %self.name, "destroyed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicI64;

    use super::*;
    use crate::store::timestamp::wall_clock_provider;

    fn map() -> EventuallyConsistentMap<String, String> {
        EventuallyConsistentMap::new("test", wall_clock_provider())
    }

    /// Provider that hands out whatever the test last stored in `next`.
    fn manual(next: &Arc<AtomicI64>) -> TimestampProvider<String, String> {
        let next = Arc::clone(next);
        Arc::new(move |_, _| Timestamp::new(next.load(Ordering::SeqCst), 0))
    }

    #[test]
    fn put_get_contains() {
        let m = map();
        m.put("a".into(), "x".into()).unwrap();
        assert_eq!(m.get(&"a".into()).unwrap().as_deref(), Some("x"));
        assert!(m.contains_key(&"a".into()).unwrap());
        assert!(!m.contains_key(&"b".into()).unwrap());
        assert_eq!(m.get(&"b".into()).unwrap(), None);
    }

    #[test]
    fn put_overwrites_existing_key() {
        let m = map();
        m.put("a".into(), "x".into()).unwrap();
        m.put("a".into(), "y".into()).unwrap();
        assert_eq!(m.get(&"a".into()).unwrap().as_deref(), Some("y"));
        assert_eq!(m.len().unwrap(), 1);
    }

    #[test]
    fn remove_is_idempotent_and_hides_value() {
        let m = map();
        m.put("a".into(), "x".into()).unwrap();
        m.remove(&"a".into()).unwrap();
        m.remove(&"a".into()).unwrap();
        m.remove(&"never".into()).unwrap();
        assert!(!m.contains_key(&"a".into()).unwrap());
        assert!(m.values().unwrap().is_empty());
        assert!(m.is_empty().unwrap());
        // Tombstone still carries a timestamp.
        assert!(m.timestamp_of(&"a".into()).is_some());
    }

    #[test]
    fn older_local_write_loses() {
        let clock = Arc::new(AtomicI64::new(200));
        let m = EventuallyConsistentMap::new("manual", manual(&clock));
        m.put("a".into(), "new".into()).unwrap();

        clock.store(100, Ordering::SeqCst);
        m.put("a".into(), "old".into()).unwrap();
        assert_eq!(m.get(&"a".into()).unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn merge_applies_only_newer_updates() {
        let clock = Arc::new(AtomicI64::new(100));
        let m = EventuallyConsistentMap::new("manual", manual(&clock));
        m.put("a".into(), "local".into()).unwrap();

        let stale = Versioned {
            value: Some("remote-old".to_owned()),
            timestamp: Timestamp::new(50, 0),
        };
        assert!(!m.merge("a".into(), stale).unwrap());

        let fresh = Versioned {
            value: Some("remote-new".to_owned()),
            timestamp: Timestamp::new(150, 0),
        };
        assert!(m.merge("a".into(), fresh).unwrap());
        assert_eq!(m.get(&"a".into()).unwrap().as_deref(), Some("remote-new"));
    }

    #[test]
    fn tombstone_blocks_stale_resurrection() {
        let clock = Arc::new(AtomicI64::new(300));
        let m = EventuallyConsistentMap::new("manual", manual(&clock));
        m.remove(&"a".into()).unwrap();

        let stale = Versioned {
            value: Some("ghost".to_owned()),
            timestamp: Timestamp::new(200, 0),
        };
        assert!(!m.merge("a".into(), stale).unwrap());
        assert!(!m.contains_key(&"a".into()).unwrap());
    }

    #[test]
    fn purge_drops_only_old_tombstones() {
        let clock = Arc::new(AtomicI64::new(100));
        let m = EventuallyConsistentMap::new("manual", manual(&clock));
        m.put("live".into(), "x".into()).unwrap();
        m.remove(&"old".into()).unwrap();
        clock.store(300, Ordering::SeqCst);
        m.remove(&"recent".into()).unwrap();

        assert_eq!(m.purge_tombstones(Timestamp::new(200, 0)).unwrap(), 1);
        assert_eq!(m.timestamp_of(&"old".into()), None);
        assert!(m.timestamp_of(&"recent".into()).is_some());
        assert_eq!(m.get(&"live".into()).unwrap().as_deref(), Some("x"));
        assert_eq!(m.purge_tombstones(Timestamp::new(200, 0)).unwrap(), 0);
    }

    #[test]
    fn replicas_converge_after_exchange() {
        let a = map();
        let b = map();
        a.put("k".into(), "from-a".into()).unwrap();
        b.put("k".into(), "from-b".into()).unwrap();
        b.put("only-b".into(), "b".into()).unwrap();

        for (k, v) in a.export().unwrap() {
            b.merge(k, v).unwrap();
        }
        for (k, v) in b.export().unwrap() {
            a.merge(k, v).unwrap();
        }

        assert_eq!(a.get(&"k".into()).unwrap(), b.get(&"k".into()).unwrap());
        assert_eq!(a.get(&"k".into()).unwrap().as_deref(), Some("from-b"));
        assert!(a.contains_key(&"only-b".into()).unwrap());
    }

    #[test]
    fn destroyed_map_rejects_operations() {
        let m = map();
        m.put("a".into(), "x".into()).unwrap();
        m.destroy();
        assert!(m.is_destroyed());
        assert!(matches!(
            m.get(&"a".into()),
            Err(StoreError::Destroyed { .. })
        ));
        assert!(m.put("b".into(), "y".into()).is_err());
        assert!(m.values().is_err());
    }
}

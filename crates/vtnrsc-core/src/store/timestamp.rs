// ── Conflict-resolution timestamps ──
//
// Every write to an eventually consistent store is stamped; replicas keep
// the entry with the greatest stamp. Wall-clock time orders writes, a
// process-wide sequence breaks ties between writes in the same nanosecond.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordering key attached to every store entry. Compared wall clock first,
/// then sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    wall_clock_nanos: i64,
    sequence: u64,
}

impl Timestamp {
    pub const fn new(wall_clock_nanos: i64, sequence: u64) -> Self {
        Self {
            wall_clock_nanos,
            sequence,
        }
    }

    pub fn wall_clock_nanos(&self) -> i64 {
        self.wall_clock_nanos
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn wall_clock(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.wall_clock_nanos)
    }

    pub fn is_newer_than(&self, other: &Self) -> bool {
        self > other
    }
}

/// Signature of a store's timestamp provider. Called with the value being
/// written, or `None` for a removal.
pub type TimestampProvider<K, V> = Arc<dyn Fn(&K, Option<&V>) -> Timestamp + Send + Sync>;

/// Monotonic wall clock. Never hands out a stamp older than one it already
/// issued, even if the system clock steps backwards.
#[derive(Debug, Default)]
pub struct WallClock {
    last_nanos: AtomicI64,
    sequence: AtomicU64,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Timestamp {
        let observed = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        let wall = self.last_nanos.fetch_max(observed, Ordering::SeqCst).max(observed);
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        Timestamp::new(wall, sequence)
    }
}

/// Default provider: every write stamped from a shared [`WallClock`].
pub fn wall_clock_provider<K, V>() -> TimestampProvider<K, V> {
    let clock = Arc::new(WallClock::new());
    Arc::new(move |_key: &K, _value: Option<&V>| clock.now())
}

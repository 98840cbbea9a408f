// ── Runtime configuration for an inventory ──
//
// Built by the caller (the CLI translates its TOML profile and flags into
// this). Core never reads configuration files itself.

use std::path::PathBuf;
use std::time::Duration;

use crate::counter::DEFAULT_INCREMENT_TIMEOUT;
use crate::manager::UpdatePolicy;

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Where to load state from on open and save it to on close. `None`
    /// keeps everything in memory.
    pub snapshot_path: Option<PathBuf>,
    /// How long a caller waits for a counter increment.
    pub counter_timeout: Duration,
    pub update_policy: UpdatePolicy,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            counter_timeout: DEFAULT_INCREMENT_TIMEOUT,
            update_policy: UpdatePolicy::default(),
        }
    }
}

impl InventoryConfig {
    /// Purely in-memory; nothing touches disk.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_counter_timeout(mut self, timeout: Duration) -> Self {
        self.counter_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }
}

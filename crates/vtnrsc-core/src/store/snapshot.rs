// ── On-disk inventory snapshot ──
//
// JSON image of the live records and replicated counters. Written to a
// sibling temp file and renamed into place so a crash never leaves a
// truncated snapshot behind.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Subnet, TenantNetwork, VirtualPort};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub version: u32,
    #[serde(default)]
    pub networks: Vec<TenantNetwork>,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default)]
    pub ports: Vec<VirtualPort>,
    /// Replicated counters only.
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
}

impl InventorySnapshot {
    pub fn new() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            ..Self::default()
        }
    }

    /// Read a snapshot. A missing file is `Ok(None)`, not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, CoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(snapshot_error(path, &e)),
        };
        let snapshot: Self = serde_json::from_str(&raw).map_err(|e| snapshot_error(path, &e))?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(CoreError::Snapshot {
                path: path.to_path_buf(),
                reason: format!(
                    "written by a newer version (format {}, this build reads up to {SNAPSHOT_VERSION})",
                    snapshot.version
                ),
            });
        }
        debug!(
            path = %path.display(),
            networks = snapshot.networks.len(),
            subnets = snapshot.subnets.len(),
            ports = snapshot.ports.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    /// Write the snapshot, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| snapshot_error(path, &e))?;
        }
        let body = serde_json::to_string_pretty(self).map_err(|e| snapshot_error(path, &e))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| snapshot_error(&tmp, &e))?;
        fs::rename(&tmp, path).map_err(|e| snapshot_error(path, &e))?;
        debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
            && self.subnets.is_empty()
            && self.ports.is_empty()
            && self.counters.is_empty()
    }
}

fn snapshot_error(path: &Path, err: &dyn std::fmt::Display) -> CoreError {
    CoreError::Snapshot {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::MacAddress;

    fn sample() -> InventorySnapshot {
        let mut snapshot = InventorySnapshot::new();
        snapshot
            .networks
            .push(TenantNetwork::new("net-1", "blue", "tenant-a"));
        snapshot.subnets.push(Subnet::new(
            "sub-1",
            "net-1",
            "tenant-a",
            "10.0.0.0/24".parse().unwrap(),
        ));
        snapshot.ports.push(VirtualPort::new(
            "port-1",
            "net-1",
            "tenant-a",
            "vm-1",
            MacAddress::parse("fa:16:3e:00:00:01").unwrap(),
        ));
        snapshot.counters.insert("c1".into(), 4);
        snapshot
    }

    #[test]
    fn save_then_load_restores_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("inventory.json");
        let snapshot = sample();
        snapshot.save(&path).unwrap();

        let loaded = InventorySnapshot::load(&path).unwrap().unwrap();
        assert_eq!(loaded, snapshot);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            InventorySnapshot::load(&dir.path().join("absent.json"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn corrupt_file_is_a_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, "{ not json").unwrap();
        let err = InventorySnapshot::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::Snapshot { .. }));
    }

    #[test]
    fn newer_format_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, r#"{"version": 99}"#).unwrap();
        assert!(InventorySnapshot::load(&path).is_err());
    }
}

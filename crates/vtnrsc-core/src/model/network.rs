// ── Tenant network domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, VariantNames};

use super::entity_id::{PhysicalNetwork, SegmentationId, TenantId, TenantNetworkId};

/// Coarse classification of a network's state.
///
/// The labels are assigned by the caller; nothing in the inventory moves a
/// network from one state to another or checks that a change is legal.
/// Parsing is by exact literal name (`"ACTIVE"`, not `"active"`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkState {
    /// The network is available.
    Active,
    /// The network is being built.
    Build,
    /// The network is unavailable.
    Down,
    /// The network is in error.
    Error,
}

/// Network type. Only local networks exist today.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkType {
    Local,
}

/// The canonical tenant network record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct TenantNetwork {
    pub id: TenantNetworkId,
    pub name: String,
    /// Administrative state: up (`true`) or down (`false`).
    pub admin_state_up: bool,
    pub state: NetworkState,
    /// Shared across all tenants.
    pub shared: bool,
    /// Owning tenant. May differ from the tenant that issued the create.
    pub tenant_id: TenantId,
    /// Externally accessible through a router.
    pub router_external: bool,
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    pub physical_network: PhysicalNetwork,
    pub segmentation_id: SegmentationId,
}

impl TenantNetwork {
    /// An administratively-up, `ACTIVE`, unshared local network.
    pub fn new(
        id: impl Into<TenantNetworkId>,
        name: impl Into<String>,
        tenant_id: impl Into<TenantId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            admin_state_up: true,
            state: NetworkState::Active,
            shared: false,
            tenant_id: tenant_id.into(),
            router_external: false,
            network_type: NetworkType::Local,
            physical_network: PhysicalNetwork::new(""),
            segmentation_id: SegmentationId::new(""),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn state_parses_exact_names_only() {
        assert_eq!("ACTIVE".parse::<NetworkState>().unwrap(), NetworkState::Active);
        assert_eq!("ERROR".parse::<NetworkState>().unwrap(), NetworkState::Error);
        assert!("active".parse::<NetworkState>().is_err());
        assert!("RUNNING".parse::<NetworkState>().is_err());
    }

    #[test]
    fn state_display_round_trips_every_variant() {
        for state in NetworkState::iter() {
            assert_eq!(state.to_string().parse::<NetworkState>().unwrap(), state);
        }
        assert_eq!(NetworkState::VARIANTS, ["ACTIVE", "BUILD", "DOWN", "ERROR"]);
    }

    #[test]
    fn type_is_local_only() {
        assert_eq!("LOCAL".parse::<NetworkType>().unwrap(), NetworkType::Local);
        assert!("VLAN".parse::<NetworkType>().is_err());
    }

    #[test]
    fn network_serializes_enum_labels() {
        let net = TenantNetwork::new("net-1", "blue", "tenant-a");
        let json = serde_json::to_value(&net).unwrap();
        assert_eq!(json["state"], "ACTIVE");
        assert_eq!(json["type"], "LOCAL");
        assert_eq!(json["tenant_id"], "tenant-a");
    }
}

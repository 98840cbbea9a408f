// ── Domain model ──
//
// Immutable resource records held by the inventory managers. "Updating"
// a record means replacing the value stored under its id.

pub mod entity_id;
pub mod network;
pub mod port;
pub mod subnet;

use thiserror::Error;

pub use entity_id::{
    DeviceId, MacAddress, PhysicalNetwork, SecurityGroupId, SegmentationId, SubnetId, TenantId,
    TenantNetworkId, VirtualPortId,
};
pub use network::{NetworkState, NetworkType, TenantNetwork};
pub use port::{AllowedAddressPair, FixedIp, PortState, VirtualPort};
pub use subnet::{AllocationPool, HostRoute, IpPrefix, IpVersion, Subnet};

/// A field string could not be turned into a model value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}': {reason}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// ── Virtual port domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use strum::{Display, EnumString, VariantNames};

use super::ParseError;
use super::entity_id::{
    DeviceId, MacAddress, SecurityGroupId, SubnetId, TenantId, TenantNetworkId, VirtualPortId,
};

/// Operational state of a virtual port.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PortState {
    Active,
    Down,
}

// ── AllowedAddressPair ──────────────────────────────────────────────

/// An (IP, MAC) pair a port may source traffic from in addition to its own
/// addresses. Compared by value; it has no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowedAddressPair {
    ip: IpAddr,
    mac: MacAddress,
}

impl AllowedAddressPair {
    pub fn new(ip: IpAddr, mac: MacAddress) -> Self {
        Self { ip, mac }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn mac(&self) -> &MacAddress {
        &self.mac
    }
}

impl fmt::Display for AllowedAddressPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.ip, self.mac)
    }
}

/// Parses `IP,MAC`.
impl FromStr for AllowedAddressPair {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ip, mac) = s
            .split_once(',')
            .ok_or_else(|| ParseError::new("allowed address pair", s, "expected IP,MAC"))?;
        let ip = ip.trim().parse().map_err(|_| {
            ParseError::new("allowed address pair", s, format!("'{ip}' is not an IP address"))
        })?;
        Ok(Self::new(ip, MacAddress::parse(mac)?))
    }
}

// ── FixedIp ─────────────────────────────────────────────────────────

/// An address assigned to a port out of one of its network's subnets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedIp {
    pub subnet_id: SubnetId,
    pub ip: IpAddr,
}

impl fmt::Display for FixedIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.subnet_id, self.ip)
    }
}

/// Parses `SUBNET_ID=IP`.
impl FromStr for FixedIp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subnet, ip) = s
            .split_once('=')
            .ok_or_else(|| ParseError::new("fixed IP", s, "expected SUBNET_ID=IP"))?;
        if subnet.is_empty() {
            return Err(ParseError::new("fixed IP", s, "subnet id is empty"));
        }
        Ok(Self {
            subnet_id: SubnetId::new(subnet),
            ip: ip
                .parse()
                .map_err(|_| ParseError::new("fixed IP", s, format!("'{ip}' is not an IP address")))?,
        })
    }
}

// ── VirtualPort ─────────────────────────────────────────────────────

/// The canonical virtual port record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualPort {
    pub id: VirtualPortId,
    pub network_id: TenantNetworkId,
    pub name: String,
    pub admin_state_up: bool,
    pub state: PortState,
    pub tenant_id: TenantId,
    pub mac_address: MacAddress,
    /// Attachment point.
    pub device_id: DeviceId,
    /// Free-form owner label (`compute:nova`, `network:router_interface`, ...).
    pub device_owner: String,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    pub binding_host_id: Option<String>,
    #[serde(default)]
    pub allowed_address_pairs: Vec<AllowedAddressPair>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupId>,
}

impl VirtualPort {
    /// An administratively-up, `ACTIVE` port with no addresses beyond its MAC.
    pub fn new(
        id: impl Into<VirtualPortId>,
        network_id: impl Into<TenantNetworkId>,
        tenant_id: impl Into<TenantId>,
        device_id: impl Into<DeviceId>,
        mac_address: MacAddress,
    ) -> Self {
        Self {
            id: id.into(),
            network_id: network_id.into(),
            name: String::new(),
            admin_state_up: true,
            state: PortState::Active,
            tenant_id: tenant_id.into(),
            mac_address,
            device_id: device_id.into(),
            device_owner: String::new(),
            fixed_ips: Vec::new(),
            binding_host_id: None,
            allowed_address_pairs: Vec::new(),
            security_groups: Vec::new(),
        }
    }
}

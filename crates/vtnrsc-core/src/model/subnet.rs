// ── Subnet domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use strum::{Display, EnumString, VariantNames};

use super::ParseError;
use super::entity_id::{SubnetId, TenantId, TenantNetworkId};

/// IP address family of a subnet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IpVersion {
    Inet,
    Inet6,
}

impl From<IpAddr> for IpVersion {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => Self::Inet,
            IpAddr::V6(_) => Self::Inet6,
        }
    }
}

// ── IpPrefix ────────────────────────────────────────────────────────

/// An address prefix in CIDR notation (`10.0.0.0/24`, `2001:db8::/64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpPrefix {
    address: IpAddr,
    prefix_len: u8,
}

impl IpPrefix {
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self, ParseError> {
        let max = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix_len > max {
            return Err(ParseError::new(
                "CIDR",
                format!("{address}/{prefix_len}"),
                format!("prefix length must be at most {max}"),
            ));
        }
        Ok(Self {
            address,
            prefix_len,
        })
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn version(&self) -> IpVersion {
        IpVersion::from(self.address)
    }

    /// Whether `ip` falls inside this prefix.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.address, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = u32::MAX
                    .checked_shl(32 - u32::from(self.prefix_len))
                    .unwrap_or(0);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = u128::MAX
                    .checked_shl(128 - u32::from(self.prefix_len))
                    .unwrap_or(0);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| ParseError::new("CIDR", s, "expected ADDRESS/LENGTH"))?;
        let address: IpAddr = addr
            .parse()
            .map_err(|_| ParseError::new("CIDR", s, format!("'{addr}' is not an IP address")))?;
        let prefix_len: u8 = len
            .parse()
            .map_err(|_| ParseError::new("CIDR", s, format!("'{len}' is not a prefix length")))?;
        Self::new(address, prefix_len)
    }
}

impl TryFrom<String> for IpPrefix {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpPrefix> for String {
    fn from(prefix: IpPrefix) -> Self {
        prefix.to_string()
    }
}

// ── Allocation pools and host routes ────────────────────────────────

/// Inclusive range of addresses handed out by DHCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationPool {
    pub start: IpAddr,
    pub end: IpAddr,
}

impl fmt::Display for AllocationPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Parses `START-END`.
impl FromStr for AllocationPool {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| ParseError::new("allocation pool", s, "expected START-END"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<IpAddr>()
                .map_err(|_| ParseError::new("allocation pool", s, format!("'{part}' is not an IP address")))
        };
        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

/// Static route pushed to hosts on the subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostRoute {
    pub destination: IpPrefix,
    pub next_hop: IpAddr,
}

impl fmt::Display for HostRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.destination, self.next_hop)
    }
}

/// Parses `DESTINATION,NEXT_HOP`.
impl FromStr for HostRoute {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (destination, next_hop) = s
            .split_once(',')
            .ok_or_else(|| ParseError::new("host route", s, "expected DESTINATION,NEXT_HOP"))?;
        Ok(Self {
            destination: destination.trim().parse()?,
            next_hop: next_hop.trim().parse().map_err(|_| {
                ParseError::new("host route", s, format!("'{next_hop}' is not an IP address"))
            })?,
        })
    }
}

// ── Subnet ──────────────────────────────────────────────────────────

/// The canonical subnet record. `network_id` must name an existing network
/// when the subnet is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: SubnetId,
    pub name: String,
    pub network_id: TenantNetworkId,
    pub tenant_id: TenantId,
    pub ip_version: IpVersion,
    pub cidr: IpPrefix,
    pub gateway_ip: Option<IpAddr>,
    pub dhcp_enabled: bool,
    pub shared: bool,
    #[serde(default)]
    pub allocation_pools: Vec<AllocationPool>,
    #[serde(default)]
    pub host_routes: Vec<HostRoute>,
}

impl Subnet {
    /// A DHCP-enabled, unshared subnet whose IP version follows `cidr`.
    pub fn new(
        id: impl Into<SubnetId>,
        network_id: impl Into<TenantNetworkId>,
        tenant_id: impl Into<TenantId>,
        cidr: IpPrefix,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            network_id: network_id.into(),
            tenant_id: tenant_id.into(),
            ip_version: cidr.version(),
            cidr,
            gateway_ip: None,
            dhcp_enabled: true,
            shared: false,
            allocation_pools: Vec::new(),
            host_routes: Vec::new(),
        }
    }
}

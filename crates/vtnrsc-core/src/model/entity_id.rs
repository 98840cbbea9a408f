// ── Core identity types ──
//
// String-backed identifiers for every tenant resource, plus the
// normalized MAC address used by ports and allowed-address pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ParseError;

// ── Identifier newtypes ─────────────────────────────────────────────

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// A fresh random (UUID v4) identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_owned()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id! {
    /// Identity of a tenant network.
    TenantNetworkId
}

string_id! {
    /// Identity of a subnet.
    SubnetId
}

string_id! {
    /// Identity of a virtual port.
    VirtualPortId
}

string_id! {
    /// Identity of the tenant that owns a resource.
    TenantId
}

string_id! {
    /// Attachment point of a virtual port (the switch/device it is bound to).
    DeviceId
}

string_id! {
    /// Physical network descriptor a tenant network is mapped onto.
    PhysicalNetwork
}

string_id! {
    /// Segmentation id (VLAN / VNI) of a tenant network.
    SegmentationId
}

string_id! {
    SecurityGroupId
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse and normalize a MAC address.
    /// Accepts colon-separated or dash-separated octets in any case.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ParseError> {
        let raw = raw.as_ref();
        let normalized = raw.trim().to_lowercase().replace('-', ":");
        let octets: Vec<&str> = normalized.split(':').collect();
        let well_formed = octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(ParseError::new(
                "MAC address",
                raw,
                "expected six hex octets such as fa:16:3e:00:00:01",
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        assert_eq!(TenantNetworkId::new("net-1"), TenantNetworkId::from("net-1"));
        assert_ne!(TenantNetworkId::new("net-1"), TenantNetworkId::new("net-2"));
    }

    #[test]
    fn id_display_is_raw_string() {
        let id: SubnetId = "sub-1".parse().unwrap();
        assert_eq!(id.to_string(), "sub-1");
    }

    #[test]
    fn generated_ids_are_distinct_uuids() {
        let a = VirtualPortId::generate();
        let b = VirtualPortId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn id_serializes_transparently() {
        let json = serde_json::to_string(&TenantId::new("tenant-a")).unwrap();
        assert_eq!(json, "\"tenant-a\"");
    }

    #[test]
    fn mac_address_normalizes_dashes() {
        let mac = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_normalizes_case() {
        let mac: MacAddress = "FA:16:3E:00:00:01".parse().unwrap();
        assert_eq!(mac.to_string(), "fa:16:3e:00:00:01");
    }

    #[test]
    fn mac_address_rejects_garbage() {
        assert!(MacAddress::parse("not-a-mac").is_err());
        assert!(MacAddress::parse("aa:bb:cc:dd:ee").is_err());
        assert!(MacAddress::parse("aa:bb:cc:dd:ee:zz").is_err());
    }

    #[test]
    fn mac_address_deserialize_validates() {
        let ok: Result<MacAddress, _> = serde_json::from_str("\"AA:BB:CC:DD:EE:FF\"");
        assert_eq!(ok.unwrap().as_str(), "aa:bb:cc:dd:ee:ff");
        let bad: Result<MacAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}

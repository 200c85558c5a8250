//! Typed packet labels with a fixed string form.
//!
//! Both enums serialize as their `Display` string, so the JSON contract stays
//! `"TCP"`, `"IP-47"`, `"192.168.1.1"`, `"Broadcast"`, ...

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use etherparse::IpNumber;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::LabelError;

/// Highest-layer protocol inferred for a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Http,
    Https,
    Dns,
    Arp,
    Ipv6,
    /// IPv4 payload with an unmapped protocol number, shown as `IP-<n>`.
    Ip(u8),
    Unknown,
}

impl Protocol {
    pub fn from_ip_number(number: IpNumber) -> Self {
        if number == IpNumber::TCP {
            Protocol::Tcp
        } else if number == IpNumber::UDP {
            Protocol::Udp
        } else if number == IpNumber::ICMP {
            Protocol::Icmp
        } else {
            Protocol::Ip(number.0)
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => f.write_str("TCP"),
            Protocol::Udp => f.write_str("UDP"),
            Protocol::Icmp => f.write_str("ICMP"),
            Protocol::Http => f.write_str("HTTP"),
            Protocol::Https => f.write_str("HTTPS"),
            Protocol::Dns => f.write_str("DNS"),
            Protocol::Arp => f.write_str("ARP"),
            Protocol::Ipv6 => f.write_str("IPv6"),
            Protocol::Ip(number) => write!(f, "IP-{number}"),
            Protocol::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

impl FromStr for Protocol {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "TCP" => Protocol::Tcp,
            "UDP" => Protocol::Udp,
            "ICMP" => Protocol::Icmp,
            "HTTP" => Protocol::Http,
            "HTTPS" => Protocol::Https,
            "DNS" => Protocol::Dns,
            "ARP" => Protocol::Arp,
            "IPv6" => Protocol::Ipv6,
            "UNKNOWN" => Protocol::Unknown,
            other => other
                .strip_prefix("IP-")
                .and_then(|number| number.parse().ok())
                .map(Protocol::Ip)
                .ok_or_else(|| LabelError(other.to_string()))?,
        })
    }
}

/// Source or destination of a packet as far as it was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    V4(Ipv4Addr),
    /// ARP frames; no per-host address is extracted.
    Broadcast,
    /// IPv6 frames; the header is not decoded further.
    Ipv6,
    Unknown,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::V4(addr) => write!(f, "{addr}"),
            Endpoint::Broadcast => f.write_str("Broadcast"),
            Endpoint::Ipv6 => f.write_str("IPv6"),
            Endpoint::Unknown => f.write_str("Unknown"),
        }
    }
}

impl FromStr for Endpoint {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Broadcast" => Endpoint::Broadcast,
            "IPv6" => Endpoint::Ipv6,
            "Unknown" => Endpoint::Unknown,
            other => other
                .parse::<Ipv4Addr>()
                .map(Endpoint::V4)
                .map_err(|_| LabelError(other.to_string()))?,
        })
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(Protocol);
string_serde!(Endpoint);

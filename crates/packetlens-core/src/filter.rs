//! Packet-table filtering: a case-insensitive search term plus an optional
//! exact protocol.

use crate::{LabelError, Packet, Protocol};

/// Label accepted in place of a protocol to mean "no protocol filter".
pub const ALL_PROTOCOLS: &str = "all";

/// A packet matches when the search term occurs (ignoring case) in its
/// source, destination, protocol or info, and its protocol equals
/// `protocol` when one is set. An empty filter matches everything.
///
/// # Examples
/// ```
/// use packetlens_core::{PacketFilter, Protocol};
///
/// let filter = PacketFilter {
///     search: Some("10.0.0".into()),
///     protocol: Some(Protocol::Tcp),
/// };
/// assert!(!filter.is_empty());
/// assert_eq!(PacketFilter::protocol_choice("all").unwrap(), None);
/// assert_eq!(PacketFilter::protocol_choice("UDP").unwrap(), Some(Protocol::Udp));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketFilter {
    pub search: Option<String>,
    pub protocol: Option<Protocol>,
}

impl PacketFilter {
    /// Parse a protocol selector: `all` or an exact protocol label.
    pub fn protocol_choice(label: &str) -> Result<Option<Protocol>, LabelError> {
        if label == ALL_PROTOCOLS {
            return Ok(None);
        }
        label.parse().map(Some)
    }

    pub fn is_empty(&self) -> bool {
        self.protocol.is_none() && self.search.as_deref().is_none_or(str::is_empty)
    }

    pub fn matches(&self, packet: &Packet) -> bool {
        let protocol_ok = self.protocol.is_none_or(|protocol| packet.protocol == protocol);
        protocol_ok && self.matches_search(packet, &self.needle())
    }

    /// Keep only matching packets, in order.
    pub fn retain(&self, packets: &mut Vec<Packet>) {
        if self.is_empty() {
            return;
        }
        let needle = self.needle();
        packets.retain(|packet| {
            self.protocol.is_none_or(|protocol| packet.protocol == protocol)
                && self.matches_search(packet, &needle)
        });
    }

    fn needle(&self) -> String {
        self.search.as_deref().unwrap_or_default().to_lowercase()
    }

    fn matches_search(&self, packet: &Packet, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        [
            packet.source.to_string(),
            packet.destination.to_string(),
            packet.protocol.to_string(),
            packet.info.clone(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

use etherparse::{EtherType, Ethernet2HeaderSlice, IpNumber};

use crate::Packet;
use crate::source::RawFrame;

use super::error::DecodeError;
use super::label::{Endpoint, Protocol};
use super::layout;
use super::reader::FrameReader;
use super::timestamp;

/// Outcome of link/network/transport classification for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layers {
    source: Endpoint,
    destination: Endpoint,
    protocol: Protocol,
    is_anomaly: bool,
}

impl Default for Layers {
    fn default() -> Self {
        Self {
            source: Endpoint::Unknown,
            destination: Endpoint::Unknown,
            protocol: Protocol::Unknown,
            is_anomaly: false,
        }
    }
}

/// Decode one raw frame into an output packet.
///
/// Never fails: a frame that cannot be classified keeps the `Unknown` /
/// `UNKNOWN` defaults so the rest of the capture still aggregates. ARP and
/// IPv6 only need the 14-byte Ethernet header; IPv4 needs 34 bytes.
pub fn decode_packet(id: u64, frame: &RawFrame<'_>) -> Packet {
    let epoch_millis = timestamp::epoch_millis(frame.ts_sec, frame.ts_usec);
    let layers = classify(frame.captured_len, frame.payload);
    let info = format!(
        "{} packet from {} to {}",
        layers.protocol, layers.source, layers.destination
    );

    Packet {
        id,
        timestamp: timestamp::clock_time(epoch_millis),
        source: layers.source,
        destination: layers.destination,
        protocol: layers.protocol,
        length: frame.captured_len,
        info,
        is_anomaly: layers.is_anomaly,
        epoch_millis,
    }
}

fn classify(captured_len: u32, frame: &[u8]) -> Layers {
    let ether_type = match Ethernet2HeaderSlice::from_slice(frame) {
        Ok(eth) => eth.ether_type(),
        Err(_) => return Layers::default(),
    };

    if ether_type == EtherType::IPV4 {
        if (captured_len as usize) < layout::MIN_IPV4_FRAME_LEN {
            return Layers::default();
        }
        classify_ipv4(captured_len, &FrameReader::new(frame)).unwrap_or_default()
    } else if ether_type == EtherType::ARP {
        Layers {
            source: Endpoint::Broadcast,
            destination: Endpoint::Broadcast,
            protocol: Protocol::Arp,
            is_anomaly: false,
        }
    } else if ether_type == EtherType::IPV6 {
        Layers {
            source: Endpoint::Ipv6,
            destination: Endpoint::Ipv6,
            protocol: Protocol::Ipv6,
            is_anomaly: false,
        }
    } else {
        Layers::default()
    }
}

/// IPv4 fields at fixed offsets (no IHL or checksum validation), then a port
/// sniff for TCP only.
fn classify_ipv4(captured_len: u32, reader: &FrameReader<'_>) -> Result<Layers, DecodeError> {
    let number = IpNumber(reader.read_u8(layout::IPV4_PROTOCOL_OFFSET)?);
    let source = reader.read_ipv4(layout::IPV4_SOURCE_RANGE)?;
    let destination = reader.read_ipv4(layout::IPV4_DESTINATION_RANGE)?;

    let mut protocol = Protocol::from_ip_number(number);
    if protocol == Protocol::Tcp && captured_len as usize > layout::TCP_PORTS_MIN_EXCLUSIVE {
        let src_port = reader.read_u16_be(layout::TCP_SOURCE_PORT_RANGE)?;
        let dst_port = reader.read_u16_be(layout::TCP_DESTINATION_PORT_RANGE)?;
        if let Some(app) = well_known_service(src_port, dst_port) {
            protocol = app;
        }
    }

    Ok(Layers {
        source: Endpoint::V4(source),
        destination: Endpoint::V4(destination),
        protocol,
        is_anomaly: is_anomalous_length(captured_len),
    })
}

/// First match wins: HTTP, then HTTPS, then DNS, on either port.
fn well_known_service(src_port: u16, dst_port: u16) -> Option<Protocol> {
    let either = |port: u16| src_port == port || dst_port == port;
    if either(layout::PORT_HTTP) {
        Some(Protocol::Http)
    } else if either(layout::PORT_HTTPS) {
        Some(Protocol::Https)
    } else if either(layout::PORT_DNS) {
        Some(Protocol::Dns)
    } else {
        None
    }
}

pub fn is_anomalous_length(captured_len: u32) -> bool {
    captured_len > layout::ANOMALY_MAX_LEN || captured_len < layout::ANOMALY_MIN_LEN
}

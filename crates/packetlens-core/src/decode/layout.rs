//! Fixed offsets into an Ethernet II frame carrying IPv4.

/// Ethernet header plus the IPv4 fields up to the destination address.
pub const MIN_IPV4_FRAME_LEN: usize = 34;
/// Frames longer than this carry at least one byte past a minimal TCP header.
pub const TCP_PORTS_MIN_EXCLUSIVE: usize = 54;

pub const IPV4_START: usize = 14;
pub const IPV4_PROTOCOL_OFFSET: usize = IPV4_START + 9;
pub const IPV4_SOURCE_RANGE: std::ops::Range<usize> = IPV4_START + 12..IPV4_START + 16;
pub const IPV4_DESTINATION_RANGE: std::ops::Range<usize> = IPV4_START + 16..IPV4_START + 20;

/// Transport header, assuming an option-less IPv4 header.
pub const TCP_START: usize = IPV4_START + 20;
pub const TCP_SOURCE_PORT_RANGE: std::ops::Range<usize> = TCP_START..TCP_START + 2;
pub const TCP_DESTINATION_PORT_RANGE: std::ops::Range<usize> = TCP_START + 2..TCP_START + 4;

pub const PORT_HTTP: u16 = 80;
pub const PORT_HTTPS: u16 = 443;
pub const PORT_DNS: u16 = 53;

/// Plausible Ethernet frame sizes; anything outside is flagged.
pub const ANOMALY_MIN_LEN: u32 = 60;
pub const ANOMALY_MAX_LEN: u32 = 1500;

//! PacketLens core library: capture-file decoding and traffic summaries.
//!
//! A capture buffer (legacy pcap in either byte order, or pcapng) is
//! classified by its magic, walked record by record, and each frame is
//! classified layer by layer: Ethernet type, IPv4/ARP/IPv6, transport
//! protocol, and a well-known-port guess. The decoded packets are then
//! reduced into a protocol distribution, a per-minute timeline and summary
//! statistics.
//!
//! Parsing is byte-oriented, single pass and side-effect free. Frame payloads
//! are borrowed from the caller's buffer; only the decoded packets are owned.
//! A capture with a damaged tail still yields every packet before the damage,
//! and `CaptureResult::integrity` says how much was left unread.
//!
//! Invariants:
//! - Packet ids are `1..=n` with no gaps.
//! - `stats` is derived from `packets` alone.
//! - Output ordering is deterministic for a given buffer, except for
//!   timestamps synthesized for pcapng Simple Packet Blocks.
//!
//! # Examples
//! ```no_run
//! use packetlens_core::parse_capture;
//!
//! let bytes = std::fs::read("capture.pcap")?;
//! let result = parse_capture(&bytes)?;
//! println!("{} packets", result.stats.total_packets);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod decode;
mod filter;
mod insight;
mod options;
mod source;
mod storage;

pub use analysis::{Aggregates, aggregate, analyze_source, parse_capture, parse_capture_with};
pub use decode::{Endpoint, LabelError, Protocol, decode_packet, is_anomalous_length};
pub use filter::{ALL_PROTOCOLS, PacketFilter};
pub use insight::{
    INSIGHT_SCHEMA_VERSION, InsightContext, InsightError, InsightGenerator, InsightReport,
    ProtocolShare, RECENT_PACKET_LIMIT, RecentPacket, TrendPoint, narrate,
};
pub use options::{NgByteOrder, ParseOptions, TimelineMode};
pub use source::{
    Endian, FrameSource, LegacyPcapReader, ParseError, PcapNgReader, RawFrame, detect_format,
};
pub use storage::{
    DirectoryStore, IngestError, StorageError, UploadResponse, UploadStore, ingest_upload,
    storage_key,
};

/// One decoded packet.
///
/// `timestamp` is the UTC clock time of capture (`HH:MM:SS`); `length` is
/// the captured length from the file.
///
/// # Examples
/// ```
/// use packetlens_core::{Endpoint, Packet, Protocol};
///
/// let packet = Packet {
///     id: 1,
///     timestamp: "12:00:00".to_string(),
///     source: Endpoint::Broadcast,
///     destination: Endpoint::Broadcast,
///     protocol: Protocol::Arp,
///     length: 42,
///     info: "ARP packet from Broadcast to Broadcast".to_string(),
///     is_anomaly: false,
///     epoch_millis: 43_200_000,
/// };
/// let json = serde_json::to_value(&packet).unwrap();
/// assert_eq!(json["protocol"], "ARP");
/// assert_eq!(json["isAnomaly"], false);
/// assert!(json.get("epochMillis").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    /// Position in the capture, starting at 1.
    pub id: u64,
    pub timestamp: String,
    pub source: Endpoint,
    pub destination: Endpoint,
    pub protocol: Protocol,
    pub length: u32,
    /// `"<protocol> packet from <source> to <destination>"`.
    pub info: String,
    pub is_anomaly: bool,
    /// Capture instant in epoch milliseconds (not serialized).
    #[serde(skip)]
    pub epoch_millis: i64,
}

/// Packet count for one protocol, with its chart color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolBucket {
    pub name: Protocol,
    pub count: u64,
    /// Palette entry picked by first-seen order, e.g. `hsl(var(--chart-1))`.
    pub fill: String,
}

/// Packet count for one timeline minute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBucket {
    /// Bucket key: `HH:MM`, or `YYYY-MM-DD HH:MM` in chronological mode.
    pub time: String,
    pub packets: u64,
}

/// Summary counters over the decoded packets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_packets: u64,
    pub anomalies: u64,
    /// Distinct protocol labels.
    pub protocols: u64,
    /// Distinct directed `source-destination` pairs.
    pub active_connections: u64,
}

/// Detected container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureFormat {
    #[serde(rename = "pcap-le")]
    PcapLittleEndian,
    #[serde(rename = "pcap-be")]
    PcapBigEndian,
    #[serde(rename = "pcapng")]
    PcapNg,
}

/// Capture-level metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInfo {
    pub format: CaptureFormat,
    /// Link type from the pcap global header or first pcapng interface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<i32>,
}

/// How much of the buffer was not turned into packets.
///
/// # Examples
/// ```
/// use packetlens_core::ReadIntegrity;
///
/// let integrity = ReadIntegrity::default();
/// assert!(integrity.is_complete());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadIntegrity {
    /// Bytes left unread at the tail plus bytes of skipped blocks.
    pub skipped_bytes: u64,
    /// Packet blocks skipped for violating their length constraints.
    pub skipped_blocks: u64,
    /// Reading stopped before the end of the buffer.
    pub truncated: bool,
}

impl ReadIntegrity {
    pub fn is_complete(&self) -> bool {
        self.skipped_bytes == 0 && self.skipped_blocks == 0 && !self.truncated
    }

    pub(crate) fn mark_truncated(&mut self, remaining: usize) {
        self.truncated = true;
        self.skipped_bytes += remaining as u64;
    }

    pub(crate) fn mark_skipped_block(&mut self, length: usize) {
        self.skipped_blocks += 1;
        self.skipped_bytes += length as u64;
    }
}

/// Everything a caller gets back from one parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub packets: Vec<Packet>,
    pub protocol_data: Vec<ProtocolBucket>,
    /// Sorted by bucket key.
    pub timeline_data: Vec<TimelineBucket>,
    pub stats: Stats,
    pub capture: CaptureInfo,
    pub integrity: ReadIntegrity,
}

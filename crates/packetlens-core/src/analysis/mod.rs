//! Capture pipeline: detect, read, decode, aggregate.

use pcap_parser::Linktype;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::decode::decode_packet;
use crate::source::{FrameSource, LegacyPcapReader, ParseError, PcapNgReader, detect_format};
use crate::{
    CaptureFormat, CaptureInfo, CaptureResult, Packet, ParseOptions, ProtocolBucket, Stats,
    TimelineBucket, TimelineMode,
};

mod protocols;
mod stats;
mod timeline;

use protocols::build_protocol_distribution;
use stats::build_stats;
use timeline::build_timeline;

/// Parse a whole capture buffer with default options.
///
/// # Errors
/// Only for buffers that are not a recognizable capture; damaged records
/// inside a recognized capture shorten the result instead.
pub fn parse_capture(buffer: &[u8]) -> Result<CaptureResult, ParseError> {
    parse_capture_with(buffer, &ParseOptions::default())
}

pub fn parse_capture_with(
    buffer: &[u8],
    options: &ParseOptions,
) -> Result<CaptureResult, ParseError> {
    let format = detect_format(buffer)?;
    let result = match format.legacy_endian() {
        Some(endian) => analyze_source(format, LegacyPcapReader::new(buffer, endian), options),
        None => analyze_source(
            format,
            PcapNgReader::new(buffer, options.pcapng_byte_order, now_unix_micros()),
            options,
        ),
    };
    debug!(
        ?format,
        bytes = buffer.len(),
        packets = result.stats.total_packets,
        skipped_bytes = result.integrity.skipped_bytes,
        "capture parsed"
    );
    Ok(result)
}

/// Decode every frame of `source` (ids start at 1) and aggregate.
pub fn analyze_source<'a, S: FrameSource<'a>>(
    format: CaptureFormat,
    mut source: S,
    options: &ParseOptions,
) -> CaptureResult {
    let mut packets = Vec::new();
    let mut next_id = 1u64;
    while let Some(frame) = source.next_frame() {
        packets.push(decode_packet(next_id, &frame));
        next_id += 1;
    }

    let link_type = source.link_type();
    if let Some(link_type) = link_type {
        if link_type != Linktype::ETHERNET {
            warn!(?link_type, "capture link type is not Ethernet; frames decoded as Ethernet II");
        }
    }

    let Aggregates {
        protocol_data,
        timeline_data,
        stats,
    } = aggregate(&packets, options.timeline);

    CaptureResult {
        packets,
        protocol_data,
        timeline_data,
        stats,
        capture: CaptureInfo {
            format,
            link_type: link_type.map(|lt| lt.0),
        },
        integrity: source.integrity(),
    }
}

/// Chart-ready summaries of a decoded packet list.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub protocol_data: Vec<ProtocolBucket>,
    pub timeline_data: Vec<TimelineBucket>,
    pub stats: Stats,
}

pub fn aggregate(packets: &[Packet], timeline: TimelineMode) -> Aggregates {
    Aggregates {
        protocol_data: build_protocol_distribution(packets),
        timeline_data: build_timeline(packets, timeline),
        stats: build_stats(packets),
    }
}

fn now_unix_micros() -> u64 {
    let micros = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000;
    u64::try_from(micros).unwrap_or(0)
}

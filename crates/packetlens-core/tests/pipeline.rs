mod common;

use std::collections::HashSet;

use common::{PcapBuilder, PcapNgBuilder, ether_frame, minimal_ipv4, tcp_frame, udp_frame};
use packetlens_core::{
    CaptureFormat, Endpoint, ParseError, ParseOptions, Protocol, TimelineMode, parse_capture,
    parse_capture_with,
};

#[test]
fn legacy_tcp_frame_decodes_addresses_and_flags_runt() {
    let frame = minimal_ipv4(6, [192, 168, 1, 1], [10, 0, 0, 1]);
    let buffer = PcapBuilder::little_endian().record(1000, 0, &frame).build();

    let result = parse_capture(&buffer).unwrap();
    assert_eq!(result.packets.len(), 1);
    let packet = &result.packets[0];
    assert_eq!(packet.id, 1);
    assert_eq!(packet.protocol, Protocol::Tcp);
    assert_eq!(packet.source.to_string(), "192.168.1.1");
    assert_eq!(packet.destination.to_string(), "10.0.0.1");
    assert_eq!(packet.length, 34);
    assert!(packet.is_anomaly);
    assert_eq!(result.capture.format, CaptureFormat::PcapLittleEndian);
    assert_eq!(result.capture.link_type, Some(1));
    assert!(result.integrity.is_complete());
}

#[test]
fn destination_port_80_is_http() {
    let mut frame = minimal_ipv4(6, [192, 168, 1, 1], [10, 0, 0, 1]);
    frame.resize(60, 0);
    frame[36..38].copy_from_slice(&[0, 80]);
    let buffer = PcapBuilder::little_endian().record(1000, 0, &frame).build();

    let result = parse_capture(&buffer).unwrap();
    assert_eq!(result.packets[0].protocol, Protocol::Http);
    assert_eq!(result.packets[0].length, 60);
    assert!(!result.packets[0].is_anomaly);
}

#[test]
fn enhanced_block_with_arp_frame() {
    let arp = ether_frame(0x0806, 32);
    let mut block = Vec::new();
    block.extend_from_slice(&6u32.to_le_bytes());
    block.extend_from_slice(&60u32.to_le_bytes());
    block.extend_from_slice(&0u32.to_le_bytes());
    block.extend_from_slice(&0u32.to_le_bytes());
    block.extend_from_slice(&1_000_000u32.to_le_bytes());
    block.extend_from_slice(&32u32.to_le_bytes());
    block.extend_from_slice(&32u32.to_le_bytes());
    block.extend_from_slice(&arp);
    assert_eq!(block.len(), 60);
    let buffer = PcapNgBuilder::new().raw(&block).build();

    let result = parse_capture(&buffer).unwrap();
    assert_eq!(result.packets.len(), 1);
    let packet = &result.packets[0];
    assert_eq!(packet.protocol, Protocol::Arp);
    assert_eq!(packet.source, Endpoint::Broadcast);
    assert_eq!(packet.destination, Endpoint::Broadcast);
    assert_eq!(packet.timestamp, "00:00:01");
    assert!(!packet.is_anomaly);
    assert_eq!(result.capture.format, CaptureFormat::PcapNg);
}

#[test]
fn oversized_record_keeps_earlier_packets() {
    let frame = tcp_frame([10, 0, 0, 1], [10, 0, 0, 2], 1234, 443, 20);
    let buffer = PcapBuilder::little_endian()
        .record(1, 0, &frame)
        .record(2, 0, &frame)
        .lying_record(5000, &[0u8; 64])
        .build();

    let result = parse_capture(&buffer).unwrap();
    assert_eq!(result.packets.len(), 2);
    assert_eq!(result.stats.total_packets, 2);
    assert!(result.integrity.truncated);
    assert_eq!(result.integrity.skipped_bytes, 16 + 64);
}

#[test]
fn big_endian_capture_matches_little_endian() {
    let frame = udp_frame([10, 0, 0, 1], [10, 0, 0, 2], 5000, 53, 40);
    let le = PcapBuilder::little_endian().record(60, 0, &frame).build();
    let be = PcapBuilder::big_endian().record(60, 0, &frame).build();

    let le_result = parse_capture(&le).unwrap();
    let be_result = parse_capture(&be).unwrap();
    assert_eq!(be_result.capture.format, CaptureFormat::PcapBigEndian);
    assert_eq!(le_result.packets, be_result.packets);
    assert_eq!(be_result.packets[0].protocol, Protocol::Udp);
}

#[test]
fn unsupported_and_truncated_inputs_fail() {
    assert_eq!(
        parse_capture(b"GIF89a").unwrap_err(),
        ParseError::UnsupportedFormat { magic: 0x3846_4947 }
    );
    assert_eq!(
        parse_capture(&[0xd4, 0xc3]).unwrap_err(),
        ParseError::TruncatedHeader { len: 2 }
    );
}

#[test]
fn ids_are_sequential_and_stats_agree_with_packets() {
    let mut builder = PcapBuilder::little_endian();
    let frames = [
        tcp_frame([10, 0, 0, 1], [10, 0, 0, 2], 40000, 80, 100),
        tcp_frame([10, 0, 0, 2], [10, 0, 0, 1], 80, 40000, 1600),
        udp_frame([10, 0, 0, 1], [8, 8, 8, 8], 40001, 53, 20),
        ether_frame(0x0806, 42),
        ether_frame(0x86dd, 70),
        minimal_ipv4(89, [10, 0, 0, 9], [224, 0, 0, 5]),
        vec![0u8; 20],
    ];
    for (idx, frame) in frames.iter().enumerate() {
        builder = builder.record(1_700_000_000 + idx as u32, 0, frame);
    }
    let result = parse_capture(&builder.build()).unwrap();

    let ids: Vec<u64> = result.packets.iter().map(|p| p.id).collect();
    assert_eq!(ids, (1..=frames.len() as u64).collect::<Vec<_>>());

    let protocols: HashSet<Protocol> = result.packets.iter().map(|p| p.protocol).collect();
    assert_eq!(result.stats.protocols, protocols.len() as u64);
    let anomalies = result.packets.iter().filter(|p| p.is_anomaly).count() as u64;
    assert_eq!(result.stats.anomalies, anomalies);
    assert_eq!(result.stats.total_packets, frames.len() as u64);

    for packet in &result.packets {
        match packet.source {
            Endpoint::V4(_) => {
                assert_eq!(
                    packet.is_anomaly,
                    packet.length > 1500 || packet.length < 60,
                    "packet {}",
                    packet.id
                );
            }
            _ => assert!(!packet.is_anomaly, "packet {}", packet.id),
        }
    }

    let labels: Vec<String> = result.packets.iter().map(|p| p.protocol.to_string()).collect();
    assert_eq!(
        labels,
        vec!["HTTP", "HTTP", "UDP", "ARP", "IPv6", "IP-89", "UNKNOWN"]
    );
    assert_eq!(result.protocol_data[0].name, Protocol::Http);
    assert_eq!(result.protocol_data[0].count, 2);
    assert_eq!(result.protocol_data.len(), 6);
}

#[test]
fn parsing_is_repeatable() {
    let frame = tcp_frame([10, 0, 0, 1], [10, 0, 0, 2], 1, 2, 10);
    let buffer = PcapBuilder::little_endian()
        .record(10, 0, &frame)
        .record(75, 0, &frame)
        .build();
    assert_eq!(parse_capture(&buffer).unwrap(), parse_capture(&buffer).unwrap());
}

#[test]
fn timeline_modes_bucket_by_minute() {
    let frame = tcp_frame([10, 0, 0, 1], [10, 0, 0, 2], 1, 2, 10);
    let buffer = PcapBuilder::little_endian()
        .record(86_340, 0, &frame)
        .record(86_350, 0, &frame)
        .record(86_460, 0, &frame)
        .build();

    let clock = parse_capture(&buffer).unwrap();
    let rows: Vec<_> = clock
        .timeline_data
        .iter()
        .map(|b| (b.time.clone(), b.packets))
        .collect();
    assert_eq!(
        rows,
        vec![("00:01".to_string(), 1), ("23:59".to_string(), 2)]
    );

    let options = ParseOptions {
        timeline: TimelineMode::Chronological,
        ..ParseOptions::default()
    };
    let chrono = parse_capture_with(&buffer, &options).unwrap();
    assert_eq!(chrono.timeline_data[0].time, "1970-01-01 23:59");
    assert_eq!(chrono.timeline_data[1].time, "1970-01-02 00:01");
}

#[test]
fn simple_packet_blocks_are_stamped_at_parse_time() {
    let frame = udp_frame([10, 0, 0, 1], [10, 0, 0, 2], 1, 2, 30);
    let buffer = PcapNgBuilder::new()
        .simple(&frame)
        .enhanced(0, &frame)
        .build();

    let result = parse_capture(&buffer).unwrap();
    assert_eq!(result.packets.len(), 2);
    assert!(result.packets[0].epoch_millis > 1_600_000_000_000);
    assert_eq!(result.packets[1].epoch_millis, 0);
    assert_eq!(result.packets[0].length, frame.len() as u32);
}

#[test]
fn malformed_pcapng_block_is_skipped() {
    let frame = udp_frame([10, 0, 0, 1], [10, 0, 0, 2], 1, 2, 30);
    let mut builder = PcapNgBuilder::new();
    builder.block(6, &[0u8; 4]);
    let buffer = builder.enhanced(1_000_000, &frame).build();

    let result = parse_capture(&buffer).unwrap();
    assert_eq!(result.packets.len(), 1);
    assert_eq!(result.packets[0].id, 1);
    assert_eq!(result.integrity.skipped_blocks, 1);
    assert!(!result.integrity.truncated);
}

#[test]
fn result_json_has_expected_shape() {
    let frame = tcp_frame([10, 0, 0, 1], [10, 0, 0, 2], 40000, 443, 10);
    let buffer = PcapBuilder::little_endian().record(3600, 0, &frame).build();
    let result = parse_capture(&buffer).unwrap();

    let value = serde_json::to_value(&result).unwrap();
    let packet = &value["packets"][0];
    assert_eq!(packet["id"], 1);
    assert_eq!(packet["timestamp"], "01:00:00");
    assert_eq!(packet["protocol"], "HTTPS");
    assert_eq!(packet["info"], "HTTPS packet from 10.0.0.1 to 10.0.0.2");
    assert_eq!(packet["isAnomaly"], false);
    assert_eq!(value["protocolData"][0]["fill"], "hsl(var(--chart-1))");
    assert_eq!(value["timelineData"][0]["time"], "01:00");
    assert_eq!(value["timelineData"][0]["packets"], 1);
    assert_eq!(value["stats"]["activeConnections"], 1);
}

#[test]
fn byte_order_magic_start_is_read_as_pcapng() {
    let frame = udp_frame([10, 0, 0, 1], [10, 0, 0, 2], 1, 2, 30);
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&0x1a2b_3c4du32.to_le_bytes());
    buffer.extend_from_slice(&12u32.to_le_bytes());
    buffer.extend_from_slice(&12u32.to_le_bytes());
    buffer.extend(PcapNgBuilder::empty().enhanced(2_000_000, &frame).build());

    let result = parse_capture(&buffer).unwrap();
    assert_eq!(result.capture.format, CaptureFormat::PcapNg);
    assert_eq!(result.packets.len(), 1);
    assert_eq!(result.packets[0].protocol, Protocol::Udp);
    assert_eq!(result.packets[0].timestamp, "00:00:02");
    assert!(result.integrity.is_complete());
}

#![allow(dead_code)]

use etherparse::PacketBuilder;

pub const PCAP_MAGIC: u32 = 0xa1b2_c3d4;

/// Legacy pcap writer in either byte order.
pub struct PcapBuilder {
    big_endian: bool,
    bytes: Vec<u8>,
}

impl PcapBuilder {
    pub fn little_endian() -> Self {
        Self::new(false)
    }

    pub fn big_endian() -> Self {
        Self::new(true)
    }

    fn new(big_endian: bool) -> Self {
        let mut builder = Self {
            big_endian,
            bytes: Vec::new(),
        };
        builder.u32(PCAP_MAGIC);
        builder.u16(2);
        builder.u16(4);
        builder.u32(0);
        builder.u32(0);
        builder.u32(65535);
        builder.u32(1);
        builder
    }

    fn u16(&mut self, value: u16) {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.bytes.extend_from_slice(&bytes);
    }

    fn u32(&mut self, value: u32) {
        let bytes = if self.big_endian {
            value.to_be_bytes()
        } else {
            value.to_le_bytes()
        };
        self.bytes.extend_from_slice(&bytes);
    }

    pub fn record(mut self, ts_sec: u32, ts_usec: u32, frame: &[u8]) -> Self {
        self.u32(ts_sec);
        self.u32(ts_usec);
        self.u32(frame.len() as u32);
        self.u32(frame.len() as u32);
        self.bytes.extend_from_slice(frame);
        self
    }

    /// Record header whose captured length claims more than is written.
    pub fn lying_record(mut self, captured_len: u32, written: &[u8]) -> Self {
        self.u32(0);
        self.u32(0);
        self.u32(captured_len);
        self.u32(captured_len);
        self.bytes.extend_from_slice(written);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Little-endian pcapng writer.
pub struct PcapNgBuilder {
    bytes: Vec<u8>,
}

impl PcapNgBuilder {
    pub fn new() -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&0x1a2b_3c4du32.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body.extend_from_slice(&(-1i64).to_le_bytes());
        let mut builder = Self { bytes: Vec::new() };
        builder.block(0x0a0d_0d0a, &body);
        let mut idb = Vec::new();
        idb.extend_from_slice(&1u16.to_le_bytes());
        idb.extend_from_slice(&0u16.to_le_bytes());
        idb.extend_from_slice(&65535u32.to_le_bytes());
        builder.block(1, &idb);
        builder
    }

    /// Writer with no section header or interface block.
    pub fn empty() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn block(&mut self, block_type: u32, body: &[u8]) {
        let total = (12 + body.len()) as u32;
        self.bytes.extend_from_slice(&block_type.to_le_bytes());
        self.bytes.extend_from_slice(&total.to_le_bytes());
        self.bytes.extend_from_slice(body);
        self.bytes.extend_from_slice(&total.to_le_bytes());
    }

    pub fn enhanced(mut self, ts_micros: u64, frame: &[u8]) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&0u32.to_le_bytes());
        body.extend_from_slice(&((ts_micros >> 32) as u32).to_le_bytes());
        body.extend_from_slice(&(ts_micros as u32).to_le_bytes());
        body.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        body.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        body.extend_from_slice(frame);
        body.resize(body.len() + (4 - frame.len() % 4) % 4, 0);
        self.block(6, &body);
        self
    }

    pub fn simple(mut self, frame: &[u8]) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        body.extend_from_slice(frame);
        body.resize(body.len() + (4 - frame.len() % 4) % 4, 0);
        self.block(3, &body);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// 34-byte Ethernet + IPv4 frame with only the fields the decoder reads.
pub fn minimal_ipv4(protocol: u8, src: [u8; 4], dst: [u8; 4]) -> Vec<u8> {
    let mut frame = vec![0u8; 34];
    frame[12..14].copy_from_slice(&0x0800u16.to_be_bytes());
    frame[23] = protocol;
    frame[26..30].copy_from_slice(&src);
    frame[30..34].copy_from_slice(&dst);
    frame
}

pub fn ether_frame(ether_type: u16, len: usize) -> Vec<u8> {
    let mut frame = vec![0u8; len];
    frame[12..14].copy_from_slice(&ether_type.to_be_bytes());
    frame
}

pub fn tcp_frame(src: [u8; 4], dst: [u8; 4], src_port: u16, dst_port: u16, payload_len: usize) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4(src, dst, 64)
        .tcp(src_port, dst_port, 1, 1024);
    let payload = vec![0u8; payload_len];
    let mut frame = Vec::<u8>::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, &payload).expect("write tcp frame");
    frame
}

pub fn udp_frame(src: [u8; 4], dst: [u8; 4], src_port: u16, dst_port: u16, payload_len: usize) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4(src, dst, 64)
        .udp(src_port, dst_port);
    let payload = vec![0u8; payload_len];
    let mut frame = Vec::<u8>::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, &payload).expect("write udp frame");
    frame
}

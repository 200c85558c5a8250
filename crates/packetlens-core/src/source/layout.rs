//! Byte offsets and magic values for legacy pcap and pcapng captures.

pub const MAGIC_LEN: usize = 4;

pub const PCAP_MAGIC_LE: u32 = 0xa1b2_c3d4;
pub const PCAP_MAGIC_BE: u32 = 0xd4c3_b2a1;
pub const PCAPNG_SECTION_HEADER: u32 = 0x0a0d_0d0a;
pub const PCAPNG_BYTE_ORDER_MAGIC: u32 = 0x1a2b_3c4d;

// Legacy pcap; record framing itself is left to `pcap_parser`.
pub const PCAP_GLOBAL_HEADER_LEN: usize = 24;

// pcapng generic block header.
pub const BLOCK_MIN_LEN: usize = 12;
pub const BLOCK_TYPE_OFFSET: usize = 0;
pub const BLOCK_LEN_OFFSET: usize = 4;

pub const BLOCK_INTERFACE_DESCRIPTION: u32 = 0x0000_0001;
pub const BLOCK_PACKET: u32 = 0x0000_0002;
pub const BLOCK_SIMPLE_PACKET: u32 = 0x0000_0003;
pub const BLOCK_ENHANCED_PACKET: u32 = 0x0000_0006;

pub const SHB_BYTE_ORDER_OFFSET: usize = 8;
pub const IDB_LINKTYPE_OFFSET: usize = 8;

// Enhanced Packet Block and the obsolete Packet Block share this layout.
pub const EPB_MIN_LEN: usize = 32;
pub const EPB_TS_HIGH_OFFSET: usize = 12;
pub const EPB_TS_LOW_OFFSET: usize = 16;
pub const EPB_CAPTURED_LEN_OFFSET: usize = 20;
pub const EPB_ORIGINAL_LEN_OFFSET: usize = 24;
pub const EPB_DATA_OFFSET: usize = 28;

pub const SPB_MIN_LEN: usize = 16;
pub const SPB_ORIGINAL_LEN_OFFSET: usize = 8;
pub const SPB_DATA_OFFSET: usize = 12;
pub const SPB_OVERHEAD: usize = 16;

pub const MICROS_PER_SECOND: u64 = 1_000_000;

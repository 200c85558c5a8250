//! Block-structured pcapng reader.
//!
//! Blocks are walked in forward order using their declared total length.
//! Enhanced, Simple and (obsolete) Packet blocks yield frames; every other
//! block type is skipped. A packet block that violates its length
//! constraints is skipped without ending the stream.
//!
//! Block headers are read little-endian unless the reader is configured with
//! `NgByteOrder::SectionHeader`, in which case each Section Header Block's
//! byte-order magic selects the order for the blocks that follow it.

use pcap_parser::Linktype;
use tracing::{debug, warn};

use crate::{NgByteOrder, ReadIntegrity};

use super::error::RecordError;
use super::layout;
use super::reader::{ByteReader, Endian};
use super::{FrameSource, RawFrame};

pub struct PcapNgReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    byte_order: NgByteOrder,
    endian: Endian,
    now_micros: u64,
    link_type: Option<Linktype>,
    integrity: ReadIntegrity,
    finished: bool,
}

impl<'a> PcapNgReader<'a> {
    /// `now_micros` is the wall-clock instant (microseconds since the epoch)
    /// stamped onto Simple Packet Blocks, which carry no timestamp.
    pub fn new(buffer: &'a [u8], byte_order: NgByteOrder, now_micros: u64) -> Self {
        Self {
            buffer,
            cursor: 0,
            byte_order,
            endian: Endian::Little,
            now_micros,
            link_type: None,
            integrity: ReadIntegrity::default(),
            finished: false,
        }
    }

    fn stop(&mut self, reason: &str) {
        let remaining = self.buffer.len().saturating_sub(self.cursor);
        if remaining > 0 {
            warn!(offset = self.cursor, remaining, reason, "pcapng block stream truncated");
            self.integrity.mark_truncated(remaining);
        }
        self.finished = true;
    }

    /// Word of the current block header. An unreadable word ends the stream.
    fn header_word(&mut self, field_offset: usize) -> Option<u32> {
        let word = ByteReader::new(self.buffer, self.endian).read_u32(self.cursor + field_offset);
        match word {
            Ok(word) => Some(word),
            Err(err) => {
                debug!(offset = self.cursor, error = %err, "unreadable block header");
                self.stop("unreadable block header");
                None
            }
        }
    }

    fn skip_malformed(&mut self, offset: usize, length: usize, err: RecordError) {
        warn!(offset, length, error = %err, "skipping malformed pcapng packet block");
        self.integrity.mark_skipped_block(length);
    }

    fn apply_section_byte_order(&mut self) {
        if self.byte_order != NgByteOrder::SectionHeader {
            return;
        }
        let magic = ByteReader::new(self.buffer, Endian::Big)
            .read_u32(self.cursor + layout::SHB_BYTE_ORDER_OFFSET);
        match magic {
            Ok(layout::PCAPNG_BYTE_ORDER_MAGIC) => self.endian = Endian::Big,
            Ok(magic) if magic == layout::PCAPNG_BYTE_ORDER_MAGIC.swap_bytes() => {
                self.endian = Endian::Little
            }
            _ => {
                debug!(
                    offset = self.cursor,
                    endian = ?self.endian,
                    "section header without a usable byte-order magic"
                );
            }
        }
    }

    fn record_link_type(&mut self, block: &ByteReader<'a>) {
        if self.link_type.is_some() {
            return;
        }
        if let Ok(raw) = block.read_u16(layout::IDB_LINKTYPE_OFFSET) {
            self.link_type = Some(Linktype(i32::from(raw)));
        }
    }
}

impl<'a> FrameSource<'a> for PcapNgReader<'a> {
    fn next_frame(&mut self) -> Option<RawFrame<'a>> {
        let buffer = self.buffer;
        while !self.finished {
            let remaining = self.buffer.len().saturating_sub(self.cursor);
            if remaining < layout::BLOCK_MIN_LEN {
                self.stop("trailing bytes shorter than a block header");
                return None;
            }

            let block_type = self.header_word(layout::BLOCK_TYPE_OFFSET)?;
            if block_type == layout::PCAPNG_SECTION_HEADER {
                self.apply_section_byte_order();
            }
            let block_len = self.header_word(layout::BLOCK_LEN_OFFSET)? as usize;

            if block_len < layout::BLOCK_MIN_LEN {
                self.stop("block length below header size");
                return None;
            }
            if block_len > remaining {
                self.stop("block length exceeds remaining buffer");
                return None;
            }

            let offset = self.cursor;
            let block = ByteReader::new(&buffer[offset..offset + block_len], self.endian);
            self.cursor += block_len;

            let parsed = match block_type {
                layout::BLOCK_ENHANCED_PACKET | layout::BLOCK_PACKET => timestamped_frame(&block),
                layout::BLOCK_SIMPLE_PACKET => simple_frame(&block, self.now_micros),
                layout::BLOCK_INTERFACE_DESCRIPTION => {
                    self.record_link_type(&block);
                    continue;
                }
                _ => continue,
            };
            match parsed {
                Ok(frame) => return Some(frame),
                Err(err) => self.skip_malformed(offset, block_len, err),
            }
        }
        None
    }

    fn integrity(&self) -> ReadIntegrity {
        self.integrity
    }

    fn link_type(&self) -> Option<Linktype> {
        self.link_type
    }
}

/// Enhanced Packet Block or obsolete Packet Block: 64-bit microsecond
/// timestamp split across two words, data at a fixed offset.
///
/// The captured bytes must fit inside this block, not just inside the
/// buffer; a block whose captured length overruns it is skipped.
fn timestamped_frame<'a>(block: &ByteReader<'a>) -> Result<RawFrame<'a>, RecordError> {
    require_block_len(block, layout::EPB_MIN_LEN)?;
    let ts_high = block.read_u32(layout::EPB_TS_HIGH_OFFSET)?;
    let ts_low = block.read_u32(layout::EPB_TS_LOW_OFFSET)?;
    let captured_len = block.read_u32(layout::EPB_CAPTURED_LEN_OFFSET)?;
    let original_len = block.read_u32(layout::EPB_ORIGINAL_LEN_OFFSET)?;
    let payload = block
        .read_slice(layout::EPB_DATA_OFFSET, captured_len as usize)
        .map_err(|_| RecordError::CaptureOverrun {
            captured: captured_len as usize,
            length: block.len(),
        })?;

    let (ts_sec, ts_usec) = split_micros(combine_timestamp(ts_high, ts_low));
    Ok(RawFrame {
        ts_sec,
        ts_usec,
        captured_len,
        original_len,
        payload,
    })
}

/// Simple Packet Block: no timestamp, captured length bounded by the block.
fn simple_frame<'a>(block: &ByteReader<'a>, now_micros: u64) -> Result<RawFrame<'a>, RecordError> {
    require_block_len(block, layout::SPB_MIN_LEN)?;
    let original_len = block.read_u32(layout::SPB_ORIGINAL_LEN_OFFSET)?;
    let room = block.len() - layout::SPB_OVERHEAD;
    let captured = (original_len as usize).min(room);
    let payload = block.read_slice(layout::SPB_DATA_OFFSET, captured)?;

    let (ts_sec, ts_usec) = split_micros(now_micros);
    Ok(RawFrame {
        ts_sec,
        ts_usec,
        captured_len: captured as u32,
        original_len,
        payload,
    })
}

fn require_block_len(block: &ByteReader<'_>, minimum: usize) -> Result<(), RecordError> {
    if block.len() < minimum {
        return Err(RecordError::BlockTooShort {
            length: block.len(),
            minimum,
        });
    }
    Ok(())
}

pub(crate) fn combine_timestamp(ts_high: u32, ts_low: u32) -> u64 {
    (u64::from(ts_high) << 32) | u64::from(ts_low)
}

/// Split epoch microseconds into `(seconds, micros)`; seconds saturate at
/// `u32::MAX`.
pub(crate) fn split_micros(micros: u64) -> (u32, u32) {
    let secs = micros / layout::MICROS_PER_SECOND;
    let usec = (micros % layout::MICROS_PER_SECOND) as u32;
    (u32::try_from(secs).unwrap_or(u32::MAX), usec)
}

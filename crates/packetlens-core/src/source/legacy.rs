//! Legacy (flat) pcap record reader.
//!
//! A fixed 24-byte global header is followed by `(16-byte record header,
//! frame)` pairs. Header and record framing come from `pcap_parser`; the magic
//! was already checked by the detector. A record whose captured length runs
//! past the end of the buffer ends the stream.

use pcap_parser::nom::{Err as NomErr, IResult, Needed};
use pcap_parser::{
    LegacyPcapBlock, Linktype, PcapError, parse_pcap_frame, parse_pcap_frame_be, parse_pcap_header,
};
use tracing::warn;

use crate::ReadIntegrity;

use super::error::RecordError;
use super::layout;
use super::reader::Endian;
use super::{FrameSource, RawFrame};

type FrameParser =
    for<'b> fn(&'b [u8]) -> IResult<&'b [u8], LegacyPcapBlock<'b>, PcapError<&'b [u8]>>;

pub struct LegacyPcapReader<'a> {
    buffer: &'a [u8],
    parse_frame: FrameParser,
    link_type: Option<Linktype>,
    cursor: usize,
    integrity: ReadIntegrity,
    finished: bool,
}

impl<'a> LegacyPcapReader<'a> {
    pub fn new(buffer: &'a [u8], endian: Endian) -> Self {
        let mut integrity = ReadIntegrity::default();
        let link_type = match parse_pcap_header(buffer) {
            Ok((_, header)) => Some(header.network),
            Err(_) => {
                integrity.mark_truncated(buffer.len());
                None
            }
        };
        let parse_frame: FrameParser = match endian {
            Endian::Little => parse_pcap_frame,
            Endian::Big => parse_pcap_frame_be,
        };
        Self {
            buffer,
            parse_frame,
            link_type,
            cursor: layout::PCAP_GLOBAL_HEADER_LEN,
            integrity,
            finished: link_type.is_none(),
        }
    }

    fn stop(&mut self, reason: RecordError) {
        let remaining = self.buffer.len().saturating_sub(self.cursor);
        if remaining > 0 {
            warn!(
                offset = self.cursor,
                remaining,
                error = %reason,
                "pcap record stream truncated"
            );
            self.integrity.mark_truncated(remaining);
        }
        self.finished = true;
    }
}

fn record_error(err: NomErr<PcapError<&[u8]>>, available: usize) -> RecordError {
    match err {
        NomErr::Incomplete(Needed::Size(missing)) => RecordError::OutOfBounds {
            needed: available + missing.get(),
            actual: available,
        },
        NomErr::Incomplete(Needed::Unknown) => RecordError::OutOfBounds {
            needed: available + 1,
            actual: available,
        },
        NomErr::Error(err) | NomErr::Failure(err) => RecordError::Framing(format!("{err:?}")),
    }
}

impl<'a> FrameSource<'a> for LegacyPcapReader<'a> {
    fn next_frame(&mut self) -> Option<RawFrame<'a>> {
        if self.finished {
            return None;
        }
        let buffer = self.buffer;
        let rest = buffer.get(self.cursor..).unwrap_or_default();
        if rest.is_empty() {
            self.finished = true;
            return None;
        }
        match (self.parse_frame)(rest) {
            Ok((tail, block)) => {
                self.cursor = buffer.len() - tail.len();
                Some(RawFrame {
                    ts_sec: block.ts_sec,
                    ts_usec: block.ts_usec,
                    captured_len: block.caplen,
                    original_len: block.origlen,
                    payload: block.data,
                })
            }
            Err(err) => {
                let reason = record_error(err, rest.len());
                self.stop(reason);
                None
            }
        }
    }

    fn integrity(&self) -> ReadIntegrity {
        self.integrity
    }

    fn link_type(&self) -> Option<Linktype> {
        self.link_type
    }
}

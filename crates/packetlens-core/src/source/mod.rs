//! Capture sources: format detection and record/block readers.
//!
//! Readers borrow the caller's buffer and hand out `RawFrame`s whose payload
//! is a slice of it; nothing is copied here. Local malformation never
//! surfaces as an error: readers stop (or skip a block) and account for the
//! bytes in `ReadIntegrity`.

mod detect;
mod error;
mod layout;
mod legacy;
mod pcapng;
mod reader;

pub use detect::detect_format;
pub use error::ParseError;
pub use legacy::LegacyPcapReader;
pub use pcapng::PcapNgReader;
pub use reader::Endian;

use pcap_parser::Linktype;

use crate::ReadIntegrity;

/// One capture record as stored in the file.
///
/// `captured_len` comes from the file and is untrusted; `payload` has already
/// been bounds-checked against the buffer and is exactly the bytes that were
/// sliced for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame<'a> {
    pub ts_sec: u32,
    pub ts_usec: u32,
    pub captured_len: u32,
    pub original_len: u32,
    pub payload: &'a [u8],
}

/// Forward-only stream of raw frames over one capture buffer.
pub trait FrameSource<'a> {
    fn next_frame(&mut self) -> Option<RawFrame<'a>>;

    /// Bytes and blocks that were not turned into frames so far.
    fn integrity(&self) -> ReadIntegrity;

    /// Link type declared by the capture, when known.
    fn link_type(&self) -> Option<Linktype>;
}

use tracing::debug;

use crate::CaptureFormat;

use super::error::ParseError;
use super::layout;
use super::reader::Endian;

/// Classify a capture buffer from its first four bytes.
///
/// The magic is read little-endian and compared against the legacy pcap
/// magic in both byte orders and against the two pcapng markers.
///
/// # Errors
/// `TruncatedHeader` when fewer than four bytes are present,
/// `UnsupportedFormat` (carrying the magic) for anything unrecognized.
pub fn detect_format(buffer: &[u8]) -> Result<CaptureFormat, ParseError> {
    let magic = read_magic(buffer)?;
    let format = match magic {
        layout::PCAP_MAGIC_LE => CaptureFormat::PcapLittleEndian,
        layout::PCAP_MAGIC_BE => CaptureFormat::PcapBigEndian,
        layout::PCAPNG_SECTION_HEADER | layout::PCAPNG_BYTE_ORDER_MAGIC => CaptureFormat::PcapNg,
        other => return Err(ParseError::UnsupportedFormat { magic: other }),
    };
    debug!(?format, magic, "capture format detected");
    Ok(format)
}

fn read_magic(buffer: &[u8]) -> Result<u32, ParseError> {
    let bytes: [u8; layout::MAGIC_LEN] = buffer
        .get(..layout::MAGIC_LEN)
        .and_then(|head| head.try_into().ok())
        .ok_or(ParseError::TruncatedHeader { len: buffer.len() })?;
    Ok(u32::from_le_bytes(bytes))
}

impl CaptureFormat {
    /// Record byte order for legacy pcap; `None` for pcapng, whose order is
    /// decided per section.
    pub fn legacy_endian(self) -> Option<Endian> {
        match self {
            CaptureFormat::PcapLittleEndian => Some(Endian::Little),
            CaptureFormat::PcapBigEndian => Some(Endian::Big),
            CaptureFormat::PcapNg => None,
        }
    }
}

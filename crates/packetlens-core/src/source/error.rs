use thiserror::Error;

/// Fatal failures of a capture parse. Nothing is decoded when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("capture too short for a format magic: got {len} bytes, need 4")]
    TruncatedHeader { len: usize },
    #[error("unsupported capture format (magic 0x{magic:08x})")]
    UnsupportedFormat { magic: u32 },
}

/// Local read failure inside a single record or block. Readers absorb these
/// and report them through `ReadIntegrity` instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record out of bounds: need {needed} bytes, got {actual}")]
    OutOfBounds { needed: usize, actual: usize },
    #[error("block length {length} below the {minimum}-byte minimum")]
    BlockTooShort { length: usize, minimum: usize },
    #[error("captured length {captured} overruns a {length}-byte block")]
    CaptureOverrun { captured: usize, length: usize },
    #[error("pcap record rejected: {0}")]
    Framing(String),
}

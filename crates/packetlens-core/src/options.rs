//! Per-call parse configuration.

use serde::{Deserialize, Serialize};

/// How packets are grouped into timeline buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineMode {
    /// `HH:MM` of the rendered clock time, sorted as strings. Captures that
    /// cross midnight fold onto the same keys.
    #[default]
    ClockMinute,
    /// `YYYY-MM-DD HH:MM`, sorted by the actual minute.
    Chronological,
}

/// Byte order used for pcapng block headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NgByteOrder {
    /// Always little-endian; big-endian producers are not supported.
    #[default]
    LittleEndian,
    /// Follow the byte-order magic of each Section Header Block.
    SectionHeader,
}

/// Options for `parse_capture_with`.
///
/// # Examples
/// ```
/// use packetlens_core::{ParseOptions, TimelineMode};
///
/// let options: ParseOptions = serde_json::from_str(r#"{"timeline":"chronological"}"#)?;
/// assert_eq!(options.timeline, TimelineMode::Chronological);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    pub timeline: TimelineMode,
    pub pcapng_byte_order: NgByteOrder,
}

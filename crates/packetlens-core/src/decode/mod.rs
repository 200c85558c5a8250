//! Layered packet classification: Ethernet type, IPv4/ARP/IPv6, transport
//! protocol, then a well-known-port guess for TCP.
//!
//! Follows the same split as the capture readers:
//! - `layout`: frame offsets and thresholds
//! - `reader`: bounds-checked field access
//! - `parser`: classification, infallible at the public edge
//! - `label`: typed protocol/endpoint labels and their string form

mod error;
mod label;
mod layout;
mod parser;
mod reader;
pub(crate) mod timestamp;

pub use error::LabelError;
pub use label::{Endpoint, Protocol};
pub use parser::{decode_packet, is_anomalous_length};

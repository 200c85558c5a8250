use std::collections::HashMap;

use crate::decode::Protocol;
use crate::{Packet, ProtocolBucket};

/// Number of chart colors; buckets cycle through them in first-seen order.
pub(crate) const PALETTE_SIZE: usize = 5;

pub(crate) fn palette_fill(index: usize) -> String {
    format!("hsl(var(--chart-{}))", index % PALETTE_SIZE + 1)
}

/// Packet count per protocol, in the order each protocol first appears.
pub(crate) fn build_protocol_distribution(packets: &[Packet]) -> Vec<ProtocolBucket> {
    let mut positions: HashMap<Protocol, usize> = HashMap::new();
    let mut buckets: Vec<ProtocolBucket> = Vec::new();

    for packet in packets {
        let position = *positions.entry(packet.protocol).or_insert_with(|| {
            buckets.push(ProtocolBucket {
                name: packet.protocol,
                count: 0,
                fill: palette_fill(buckets.len()),
            });
            buckets.len() - 1
        });
        buckets[position].count += 1;
    }
    buckets
}

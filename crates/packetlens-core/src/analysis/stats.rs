use std::collections::HashSet;

use crate::decode::{Endpoint, Protocol};
use crate::{Packet, Stats};

#[derive(Debug, Default)]
struct StatsAccumulator<'a> {
    total: u64,
    anomalies: u64,
    protocols: HashSet<&'a Protocol>,
    connections: HashSet<(&'a Endpoint, &'a Endpoint)>,
}

/// Direction matters for connections: A->B and B->A count twice.
pub(crate) fn build_stats(packets: &[Packet]) -> Stats {
    let acc = packets
        .iter()
        .fold(StatsAccumulator::default(), |mut acc, packet| {
            acc.total += 1;
            acc.anomalies += u64::from(packet.is_anomaly);
            acc.protocols.insert(&packet.protocol);
            acc.connections
                .insert((&packet.source, &packet.destination));
            acc
        });

    Stats {
        total_packets: acc.total,
        anomalies: acc.anomalies,
        protocols: acc.protocols.len() as u64,
        active_connections: acc.connections.len() as u64,
    }
}

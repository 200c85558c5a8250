use std::collections::BTreeMap;

use crate::decode::timestamp::{epoch_minute, minute_label};
use crate::{Packet, TimelineBucket, TimelineMode};

pub(crate) fn build_timeline(packets: &[Packet], mode: TimelineMode) -> Vec<TimelineBucket> {
    match mode {
        TimelineMode::ClockMinute => clock_minute_timeline(packets),
        TimelineMode::Chronological => chronological_timeline(packets),
    }
}

/// `HH:MM` prefix of a rendered clock string.
pub(crate) fn clock_minute_key(timestamp: &str) -> String {
    timestamp.split(':').take(2).collect::<Vec<_>>().join(":")
}

fn clock_minute_timeline(packets: &[Packet]) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for packet in packets {
        *buckets.entry(clock_minute_key(&packet.timestamp)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(time, packets)| TimelineBucket { time, packets })
        .collect()
}

fn chronological_timeline(packets: &[Packet]) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for packet in packets {
        *buckets.entry(epoch_minute(packet.epoch_millis)).or_default() += 1;
    }
    buckets
        .into_iter()
        .map(|(minute, packets)| TimelineBucket {
            time: minute_label(minute),
            packets,
        })
        .collect()
}

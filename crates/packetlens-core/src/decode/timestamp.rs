use time::OffsetDateTime;
use time::macros::format_description;

/// Rendered in place of a clock string for instants `time` cannot represent.
pub const INVALID_TIME: &str = "Invalid Date";

const NANOS_PER_MILLI: i128 = 1_000_000;
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Capture instant in epoch milliseconds; sub-millisecond precision is
/// dropped.
pub fn epoch_millis(ts_sec: u32, ts_usec: u32) -> i64 {
    i64::from(ts_sec) * 1000 + i64::from(ts_usec) / 1000
}

fn to_datetime(epoch_millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_millis) * NANOS_PER_MILLI).ok()
}

/// UTC wall-clock time `HH:MM:SS`.
pub fn clock_time(epoch_millis: i64) -> String {
    to_datetime(epoch_millis)
        .and_then(|dt| dt.format(format_description!("[hour]:[minute]:[second]")).ok())
        .unwrap_or_else(|| INVALID_TIME.to_string())
}

/// Whole minutes since the epoch (floored).
pub fn epoch_minute(epoch_millis: i64) -> i64 {
    epoch_millis.div_euclid(MILLIS_PER_MINUTE)
}

/// UTC `YYYY-MM-DD HH:MM` for a minute returned by `epoch_minute`.
pub fn minute_label(epoch_minute: i64) -> String {
    to_datetime(epoch_minute.saturating_mul(MILLIS_PER_MINUTE))
        .and_then(|dt| {
            dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
                .ok()
        })
        .unwrap_or_else(|| INVALID_TIME.to_string())
}

use crate::stamp::Stamp;

/// Format seconds as `HH:MM:SS.mmm`.
///
/// Hours are not wrapped at 24 (a 30 hour recording reads `30:00:00.000`). Milliseconds are
/// truncated rather than rounded so a stamp never displays later than it is; the value is first
/// snapped to whole microseconds so float noise like `1.001 -> 1.00099999` doesn't lose a
/// millisecond. Nudging can push a start below zero, which is rendered with a leading `-`.
pub fn format_timestamp(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total_us = (seconds.abs() * 1_000_000.0).round() as u64;

    let ms = (total_us / 1_000) % 1_000;
    let total_s = total_us / 1_000_000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{sign}{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Human-readable span of a stamp, suitable for appending to a sentence.
///
/// Closed stamps read ` between A and B.`, open ones ` from A.`.
pub fn describe_range(stamp: &Stamp) -> String {
    match stamp.end_time {
        Some(end) => format!(
            " between {} and {}.",
            format_timestamp(stamp.start_time),
            format_timestamp(end)
        ),
        None => format!(" from {}.", format_timestamp(stamp.start_time)),
    }
}

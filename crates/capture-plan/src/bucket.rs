use chrono::{DateTime, TimeZone, Utc};

/// Width of one artifact grouping window, in seconds.
pub const BUCKET_WINDOW_SECS: i64 = 300;

/// Rounds `now` to the nearest window boundary (half-up), so requests issued
/// close together land in the same bucket.
pub fn bucket_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let secs = now.timestamp();
    let rounded = (secs + BUCKET_WINDOW_SECS / 2).div_euclid(BUCKET_WINDOW_SECS) * BUCKET_WINDOW_SECS;
    Utc.timestamp_opt(rounded, 0).single().unwrap_or(now)
}

/// Stable, object-key safe label for the window containing `now`.
///
/// Two calls inside the same window yield byte-identical labels; calls in
/// different windows never collide.
pub fn bucket_label(now: DateTime<Utc>) -> String {
    bucket_start(now).format("%Y-%m-%d_%H-%M-%S").to_string()
}

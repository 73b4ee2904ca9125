use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, the timestamp unit used on
/// `NetworkInfo` and for cache recency.
pub fn time_since_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

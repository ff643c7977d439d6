//! Time utilities.
//!
//! All timestamps in the system are Unix epoch milliseconds (UTC). HTTP
//! responses and recording metadata render them as RFC 3339.

use chrono::{TimeZone, Utc};

/// Get the current Unix timestamp in milliseconds (UTC).
pub fn now_utc_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a Unix timestamp (milliseconds) to an RFC 3339 string (UTC).
///
/// Out-of-range timestamps fall back to the epoch rather than panicking;
/// they can only come from a corrupted clock, not from user input.
pub fn millis_to_rfc3339(timestamp_millis: i64) -> String {
    let seconds = timestamp_millis.div_euclid(1000);
    let nanos = (timestamp_millis.rem_euclid(1000) * 1_000_000) as u32;
    Utc.timestamp_opt(seconds, nanos)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().unwrap_or_default())
        .to_rfc3339()
}

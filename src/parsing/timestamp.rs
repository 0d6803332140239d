//! Cocoa reference-date timestamps.
//!
//! Archives store send times as seconds since 2001-01-01T00:00:00Z.

use chrono::{DateTime, TimeDelta, Utc};

/// Unix time of the Cocoa reference date.
pub const COCOA_EPOCH_UNIX: i64 = 978_307_200;

/// Returns the Cocoa reference date.
pub fn cocoa_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(COCOA_EPOCH_UNIX, 0).unwrap_or_default()
}

/// Decodes a Cocoa timestamp, rounded to the microsecond.
///
/// Returns `None` for non-finite or out-of-range values.
///
/// ```rust
/// use ichatpack::parsing::datetime_from_cocoa;
///
/// let ts = datetime_from_cocoa(86_400.0).unwrap();
/// assert_eq!(ts.to_rfc3339(), "2001-01-02T00:00:00+00:00");
/// ```
pub fn datetime_from_cocoa(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let micros = (seconds * 1_000_000.0).round_ties_even();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    cocoa_epoch().checked_add_signed(TimeDelta::microseconds(micros as i64))
}

/// Encodes a timestamp as Cocoa seconds.
pub fn cocoa_from_datetime(ts: DateTime<Utc>) -> f64 {
    let delta = ts - cocoa_epoch();
    delta.num_microseconds().map_or(delta.num_seconds() as f64, |us| us as f64 / 1_000_000.0)
}

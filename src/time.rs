//! Sampling-grid alignment.
//!
//! Every generator instance quantizes wall-clock time onto the same grid so that repeated or
//! parallel calls at "the same moment" produce bit-identical output.

use crate::types::Timestamp;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Converts a duration to whole milliseconds, saturating at `i64::MAX`.
#[inline]
pub(crate) fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// Returns the largest multiple of `interval` (counted from the epoch) that is `<= t`.
///
/// `interval` must be at least one millisecond; validated configurations guarantee this.
/// A zero-width interval has no grid, so `t` is returned unchanged.
#[inline]
pub fn align(t: Timestamp, interval: Duration) -> Timestamp {
    let step = duration_millis(interval);
    if step <= 0 {
        return t;
    }
    t - t.rem_euclid(step)
}

/// Returns the first grid point strictly after `t`.
#[inline]
pub fn next_tick_after(t: Timestamp, interval: Duration) -> Timestamp {
    let step = duration_millis(interval);
    if step <= 0 {
        return t;
    }
    align(t, interval).saturating_add(step)
}

/// Converts a `SystemTime` into signed epoch milliseconds.
pub fn system_time_millis(t: SystemTime) -> Timestamp {
    match t.duration_since(UNIX_EPOCH) {
        Ok(after) => duration_millis(after),
        Err(e) => -duration_millis(e.duration()),
    }
}

/// Current wall-clock time in epoch milliseconds.
#[inline]
pub fn now_millis() -> Timestamp {
    system_time_millis(SystemTime::now())
}

/// Aligns a `SystemTime` onto the sampling grid.
pub fn align_system_time(t: SystemTime, interval: Duration) -> Timestamp {
    align(system_time_millis(t), interval)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_SECONDS: Duration = Duration::from_secs(10);

    #[test]
    fn test_align_to_interval() {
        assert_eq!(align(30_000, TEN_SECONDS), 30_000);
        assert_eq!(align(31_000, TEN_SECONDS), 30_000);
        assert_eq!(align(39_000, TEN_SECONDS), 30_000);
        assert_eq!(align(39_999, TEN_SECONDS), 30_000);
        assert_eq!(align(40_000, TEN_SECONDS), 40_000);
    }

    #[test]
    fn test_align_is_idempotent() {
        for t in [-25_001, -1, 0, 1, 9_999, 123_456_789] {
            let once = align(t, TEN_SECONDS);
            assert_eq!(align(once, TEN_SECONDS), once);
        }
    }

    #[test]
    fn test_align_before_epoch_floors_downward() {
        assert_eq!(align(-1, TEN_SECONDS), -10_000);
        assert_eq!(align(-10_000, TEN_SECONDS), -10_000);
        assert_eq!(align(-10_001, TEN_SECONDS), -20_000);
    }

    #[test]
    fn test_next_tick_after() {
        assert_eq!(next_tick_after(30_000, TEN_SECONDS), 40_000);
        assert_eq!(next_tick_after(39_999, TEN_SECONDS), 40_000);
        assert_eq!(next_tick_after(-1, TEN_SECONDS), 0);
    }

    #[test]
    fn test_zero_interval_is_identity() {
        assert_eq!(align(12_345, Duration::ZERO), 12_345);
        assert_eq!(next_tick_after(12_345, Duration::ZERO), 12_345);
    }

    #[test]
    fn test_system_time_conversion() {
        let t = UNIX_EPOCH + Duration::from_millis(31_500);
        assert_eq!(system_time_millis(t), 31_500);
        assert_eq!(align_system_time(t, TEN_SECONDS), 30_000);

        let before = UNIX_EPOCH - Duration::from_millis(1_500);
        assert_eq!(system_time_millis(before), -1_500);
    }
}

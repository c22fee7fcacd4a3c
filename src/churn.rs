//! Staggered label churn.
//!
//! Each rank owns a rotating generation id that increments once per churn period. Ranks are
//! phase-shifted by equal slots, so across one period exactly one rank's id changes every
//! `period / num_series`, walking from rank `N` down to rank `1`. This mimics a rolling
//! deployment replacing instances one at a time instead of relabeling every series at once.

use crate::time::duration_millis;
use crate::types::{Rank, Timestamp};

use std::time::Duration;

/// Phase offset of `rank` in milliseconds: `(num_series - rank) * period / num_series`.
///
/// Multiplies before dividing so the truncation error stays under one millisecond for every
/// rank instead of growing with `num_series - rank`.
#[inline]
pub fn phase_offset(rank: Rank, period: Duration, num_series: usize) -> i64 {
    if num_series == 0 {
        return 0;
    }
    let steps = num_series.saturating_sub(rank) as i128;
    (steps * duration_millis(period) as i128 / num_series as i128) as i64
}

/// Computes the churn generation id of `rank` at `t`.
///
/// Returns `None` when churn is disabled (`period` is zero) or there are no series, in which
/// case the churn label is omitted altogether.
///
/// The id is `floor((t - phase(rank)) / period) + 1`, floored toward negative infinity so
/// instants before the epoch keep the same stepping.
pub fn generation_id(rank: Rank, t: Timestamp, period: Duration, num_series: usize) -> Option<i64> {
    let period_ms = duration_millis(period);
    if period_ms <= 0 || num_series == 0 {
        return None;
    }
    let shifted = t - phase_offset(rank, period, num_series);
    Some(shifted.div_euclid(period_ms) + 1)
}

use proptest::prelude::*;
use std::time::Duration;

use wavegen::churn::generation_id;
use wavegen::time::align;
use wavegen::Timestamp;

const YEAR_MS: i64 = 365 * 24 * 3600 * 1000;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_align_is_idempotent_and_bounded(t in -YEAR_MS..(60 * YEAR_MS), interval_ms in 1u64..3_600_000) {
        let interval = Duration::from_millis(interval_ms);
        let a = align(t, interval);
        prop_assert_eq!(align(a, interval), a);
        prop_assert!(a <= t);
        prop_assert!(t - a < interval_ms as i64);
        prop_assert_eq!(a.rem_euclid(interval_ms as i64), 0);
    }

    #[test]
    fn prop_generation_id_is_monotonic(
        num_series in 1usize..50,
        rank_seed in 0usize..50,
        period_secs in 1u64..3600,
        t in -YEAR_MS..(60 * YEAR_MS),
        dt in 0i64..(24 * 3600 * 1000),
    ) {
        let rank = rank_seed % num_series + 1;
        let period = Duration::from_secs(period_secs);
        let a = generation_id(rank, t, period, num_series).unwrap();
        let b = generation_id(rank, t + dt, period, num_series).unwrap();
        prop_assert!(b >= a);
        // Never more than one increment per elapsed period (rounded up).
        let period_ms = period_secs as i64 * 1000;
        prop_assert!(b - a <= dt / period_ms + 1);
    }

    #[test]
    fn prop_generation_id_steps_once_per_period(
        num_series in 1usize..50,
        rank_seed in 0usize..50,
        period_secs in 1u64..3600,
        t in -YEAR_MS..(60 * YEAR_MS),
    ) {
        let rank = rank_seed % num_series + 1;
        let period = Duration::from_secs(period_secs);
        let period_ms = period_secs as i64 * 1000;
        let a = generation_id(rank, t, period, num_series).unwrap();
        let b = generation_id(rank, t + period_ms, period, num_series).unwrap();
        prop_assert_eq!(b, a + 1);
    }

    #[test]
    fn prop_at_most_one_rank_changes_per_slot(
        num_series in 1usize..20,
        slot_secs in 1u64..120,
        t in 0i64..(60 * YEAR_MS),
    ) {
        let period = Duration::from_secs(slot_secs * num_series as u64);
        let slot_ms = slot_secs as i64 * 1000;
        // Start right at a slot boundary so the step covers exactly one slot.
        let start: Timestamp = t - t.rem_euclid(slot_ms);
        let changed = (1..=num_series)
            .filter(|&r| {
                generation_id(r, start, period, num_series)
                    != generation_id(r, start + slot_ms, period, num_series)
            })
            .count();
        prop_assert_eq!(changed, 1);
    }
}

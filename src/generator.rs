//! Per-tick series generation.

use crate::config::GenerationConfig;
use crate::labels::series_labels;
use crate::types::{Rank, Sample, TimeSeries, Timestamp};
use crate::wave::sine_wave_value;

use rayon::prelude::*;

/// Series counts at or above this are built on the rayon pool.
pub const PARALLEL_GENERATION_THRESHOLD: usize = 4096;

#[inline]
fn build_series(rank: Rank, t: Timestamp, sample: Sample, config: &GenerationConfig) -> TimeSeries {
    TimeSeries {
        labels: series_labels(rank, t, config),
        samples: vec![sample],
    }
}

/// Generates the series set for tick `t` (epoch milliseconds).
///
/// Returns exactly `config.num_series` series in ascending rank order: position `i` holds
/// rank `i + 1`. Each series carries one sample at `t`. The function is pure; callers on any
/// number of threads get identical output for identical arguments.
///
/// `config` is expected to have passed [`GenerationConfig::validate`].
pub fn generate(t: Timestamp, config: &GenerationConfig) -> Vec<TimeSeries> {
    let sample = Sample {
        timestamp: t,
        value: sine_wave_value(t),
    };

    if config.num_series >= PARALLEL_GENERATION_THRESHOLD {
        // Indexed collect keeps rank order.
        (1..=config.num_series)
            .into_par_iter()
            .map(|rank| build_series(rank, t, sample, config))
            .collect()
    } else {
        (1..=config.num_series)
            .map(|rank| build_series(rank, t, sample, config))
            .collect()
    }
}

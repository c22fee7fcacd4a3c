use crate::types::{Timestamp, Value};

use std::f64::consts::TAU;
use std::time::Duration;

/// Period of the generated sine wave.
pub const SINE_WAVE_PERIOD: Duration = Duration::from_secs(10 * 60);

/// Peak absolute value of the generated sine wave.
pub const SINE_WAVE_AMPLITUDE: Value = 1.0;

const PERIOD_MS: i64 = SINE_WAVE_PERIOD.as_millis() as i64;

/// Value of the sine wave at `t` (epoch milliseconds).
///
/// Depends on absolute time only: every series sampled at the same instant carries the same
/// value, and the result is identical across processes and restarts. The phase is taken from
/// `t mod period` in integer milliseconds, so precision does not drift for large timestamps.
#[inline]
pub fn sine_wave_value(t: Timestamp) -> Value {
    let phase = t.rem_euclid(PERIOD_MS) as f64 / PERIOD_MS as f64;
    SINE_WAVE_AMPLITUDE * (TAU * phase).sin()
}

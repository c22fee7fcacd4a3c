//! Generator and writer configuration plus startup validation.
//!
//! The generation engine assumes a validated configuration; every precondition it relies on is
//! checked here so violations surface to the operator at startup rather than mid-run.

use crate::error::ConfigError;
use crate::labels::METADATA_LABEL_POOL;

use std::time::Duration;

/// Parameters of the series set produced on every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Number of series ranks emitted per tick (`1..=num_series`).
    pub num_series: usize,
    /// Number of synthetic metadata labels drawn from the front of the metadata pool.
    pub num_extra_labels: usize,
    /// Length of one full churn cycle. Zero disables the churn label.
    pub churn_period: Duration,
    /// Prefix prepended to churn and metadata label names. May be empty.
    pub label_prefix: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            num_series: 1000,
            num_extra_labels: 0,
            churn_period: Duration::ZERO,
            label_prefix: String::new(),
        }
    }
}

impl GenerationConfig {
    /// Convenience constructor with churn and metadata labels disabled.
    pub fn with_series(num_series: usize) -> Self {
        GenerationConfig {
            num_series,
            ..Default::default()
        }
    }

    /// Whether the churn label is emitted.
    #[inline]
    pub fn churn_enabled(&self) -> bool {
        !self.churn_period.is_zero()
    }

    /// Checks every precondition of the generation engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_series == 0 {
            return Err(ConfigError::ZeroSeries);
        }
        if self.num_extra_labels > METADATA_LABEL_POOL.len() {
            return Err(ConfigError::TooManyExtraLabels {
                requested: self.num_extra_labels,
                available: METADATA_LABEL_POOL.len(),
            });
        }
        if self.churn_enabled() && self.churn_period.subsec_nanos() % 1_000_000 != 0 {
            return Err(ConfigError::SubMillisecondChurnPeriod {
                nanos: self.churn_period.as_nanos(),
            });
        }
        if self.churn_enabled() && self.churn_period.as_millis() < self.num_series as u128 {
            return Err(ConfigError::ChurnPeriodTooShort {
                period_ms: self.churn_period.as_millis(),
                num_series: self.num_series,
            });
        }
        Ok(())
    }
}

/// Configuration of the tick-driven [`crate::writer::LoadWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Distance between ticks; also the alignment grid.
    pub interval: Duration,
    /// Maximum number of series handed to the sink in one write.
    pub batch_size: usize,
    /// Maximum number of batches written concurrently within a tick.
    pub parallelism: usize,
    /// Series set generated on each tick.
    pub generation: GenerationConfig,
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            interval: crate::DEFAULT_TICK_INTERVAL,
            batch_size: 1000,
            parallelism: 10,
            generation: GenerationConfig::default(),
        }
    }
}

impl WriterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.interval.subsec_nanos() % 1_000_000 != 0 {
            return Err(ConfigError::SubMillisecondInterval {
                nanos: self.interval.as_nanos(),
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        self.generation.validate()
    }
}

#![doc = include_str!("../README.md")]
// Declare modules
pub mod batch;
pub mod churn;
pub mod config;
pub mod error;
pub mod generator;
pub mod labels;
pub mod sink;
pub mod telemetry;
pub mod time;
pub mod types;
pub mod wave;
pub mod writer;

/// Per-tick series generation entry point.
pub use crate::generator::generate;
/// Churn generation id of a rank at an instant.
pub use crate::churn::generation_id;
/// Configuration of the generated series set.
pub use crate::config::GenerationConfig;
/// Configuration of the tick-driven writer.
pub use crate::config::WriterConfig;
/// Error types for configuration, sinks and the writer.
pub use crate::error::{ConfigError, SinkError, WavegenError};
/// Label set builder for one series.
pub use crate::labels::series_labels;
/// Destinations for generated batches.
pub use crate::sink::{DiscardSink, JsonLinesSink, SeriesSink};
/// Structured event hook for observability.
pub use crate::telemetry::{WavegenEvent, WavegenEventListener};
/// Sampling-grid alignment.
pub use crate::time::align;
/// Generated series records.
pub use crate::types::{Label, Rank, Sample, TimeSeries, Timestamp, Value};
/// Sine wave value at an instant.
pub use crate::wave::sine_wave_value;
/// Background writer and its per-tick report.
pub use crate::writer::{LoadWriter, TickReport};

use std::time::Duration;
/// The default interval between ticks (10 seconds).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);

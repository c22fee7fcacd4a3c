use thiserror::Error;

/// Configuration rejected before the generator or writer runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("num_series must be at least 1")]
    ZeroSeries,

    #[error("interval must be greater than zero")]
    ZeroInterval,

    #[error("interval must be a whole number of milliseconds, got {nanos}ns")]
    SubMillisecondInterval { nanos: u128 },

    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("parallelism must be at least 1")]
    ZeroParallelism,

    #[error("num_extra_labels={requested} exceeds the metadata label pool size ({available})")]
    TooManyExtraLabels { requested: usize, available: usize },

    /// A non-zero churn period shorter than one millisecond per series collapses the phase slots.
    #[error("churn_period of {period_ms}ms is shorter than num_series={num_series} milliseconds")]
    ChurnPeriodTooShort { period_ms: u128, num_series: usize },

    #[error("churn_period must be a whole number of milliseconds, got {nanos}ns")]
    SubMillisecondChurnPeriod { nanos: u128 },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure reported by a [`crate::sink::SeriesSink`].
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding Error: {0}")]
    Encode(String),

    #[error("Batch rejected: {0}")]
    Rejected(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl<T> From<std::sync::PoisonError<T>> for SinkError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        SinkError::LockError(format!("Mutex poisoned: {}", err))
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Encode(err.to_string())
    }
}

/// Top-level error type for the writer and daemon.
#[derive(Error, Debug)]
pub enum WavegenError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sink Error: {0}")]
    Sink(#[from] SinkError),

    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task error: {0}")]
    BackgroundTaskError(String),
}

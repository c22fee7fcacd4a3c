use std::sync::Arc;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::types::Timestamp;

/// Structured, in-process event hook for observability.
///
/// This crate is a library; emitting logs directly (e.g. `println!`) is not acceptable here.
/// Callers provide an implementation that forwards these events to their logging, metrics or
/// custom sinks.
pub trait WavegenEventListener: std::fmt::Debug + Send + Sync + 'static {
    fn on_event(&self, event: WavegenEvent);
}

/// Structured events emitted by the load writer.
#[derive(Debug, Clone, PartialEq)]
pub enum WavegenEvent {
    WriterStarted,
    WriterStopping,
    WriterPanicked,

    TickCompleted {
        timestamp: Timestamp,
        series: usize,
        batches: usize,
        failed_batches: usize,
        duration: Duration,
    },

    BatchWriteFailed {
        timestamp: Timestamp,
        batch_index: usize,
        error: String,
    },
}

#[derive(Debug)]
pub struct NoopEventListener;

impl WavegenEventListener for NoopEventListener {
    #[inline]
    fn on_event(&self, _event: WavegenEvent) {}
}

pub fn noop_event_listener() -> Arc<dyn WavegenEventListener> {
    Arc::new(NoopEventListener)
}

/// Metrics instrumentation and in-process scraping.
///
/// ## Key properties
/// - Library-safe: emitting metrics is effectively a no-op until a recorder is installed.
/// - Serverless scraping: callers can render Prometheus exposition text in-process.
/// - Low operational overhead: a lightweight upkeep thread keeps histograms bounded.
pub mod wavegen_metrics {
    use super::*;

    use ::metrics::{describe_counter, describe_histogram, Unit};

    #[cfg(feature = "prometheus")]
    use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

    // --- metric names ---
    //
    // Counters are exposed as `<name>_total` by the Prometheus exporter.
    // Histograms are exposed as `<name>_bucket`, `<name>_sum`, `<name>_count`.

    pub const TICKS: &str = "wavegen_ticks";
    pub const SERIES_GENERATED: &str = "wavegen_series_generated";
    pub const WRITE_REQUESTS: &str = "wavegen_write_requests";
    pub const WRITE_REQUEST_DURATION_SECONDS: &str = "wavegen_write_request_duration_seconds";
    pub const TICK_DURATION_SECONDS: &str = "wavegen_tick_duration_seconds";

    pub const STATUS_LABEL: &str = "status";
    pub const STATUS_SUCCESS: &str = "success";
    pub const STATUS_FAILURE: &str = "failure";

    /// Handle to the in-process Prometheus recorder/scrape renderer.
    ///
    /// This does **not** start an HTTP server. Call [`InProcessPrometheus::render`] to scrape.
    #[cfg(feature = "prometheus")]
    #[derive(Debug)]
    pub struct InProcessPrometheus {
        handle: PrometheusHandle,
        stop: Arc<AtomicBool>,
        upkeep_thread: Mutex<Option<JoinHandle<()>>>,
    }

    #[cfg(feature = "prometheus")]
    impl InProcessPrometheus {
        /// Installs a global Prometheus recorder (once per process) and starts a small upkeep thread.
        ///
        /// The upkeep thread periodically calls `run_upkeep()`, which `install_recorder` requires.
        pub fn install(upkeep_interval: Duration) -> Result<Self, MetricsInitError> {
            describe_all();

            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(MetricsInitError::from_build_error)?;

            let stop = Arc::new(AtomicBool::new(false));
            let stop_clone = stop.clone();
            let handle_clone = handle.clone();
            let upkeep_thread = std::thread::Builder::new()
                .name("wavegen-metrics-upkeep".to_string())
                .spawn(move || {
                    while !stop_clone.load(Ordering::Relaxed) {
                        std::thread::sleep(upkeep_interval);
                        handle_clone.run_upkeep();
                    }
                })
                .map_err(|e| MetricsInitError::ThreadSpawn(e.to_string()))?;

            Ok(Self {
                handle,
                stop,
                upkeep_thread: Mutex::new(Some(upkeep_thread)),
            })
        }

        /// Renders the current metrics in the Prometheus text exposition format.
        pub fn render(&self) -> String {
            self.handle.render()
        }
    }

    #[cfg(feature = "prometheus")]
    impl Drop for InProcessPrometheus {
        fn drop(&mut self) {
            self.stop.store(true, Ordering::Relaxed);
            if let Ok(mut guard) = self.upkeep_thread.lock() {
                if let Some(t) = guard.take() {
                    let _ = t.join();
                }
            }
        }
    }

    #[cfg(feature = "prometheus")]
    #[derive(Debug, thiserror::Error)]
    pub enum MetricsInitError {
        #[error("metrics recorder already installed")]
        AlreadyInstalled,
        #[error("failed to install prometheus recorder: {0}")]
        Install(String),
        #[error("failed to spawn upkeep thread: {0}")]
        ThreadSpawn(String),
    }

    #[cfg(feature = "prometheus")]
    impl MetricsInitError {
        fn from_build_error(e: BuildError) -> Self {
            match e {
                BuildError::FailedToSetGlobalRecorder(_) => MetricsInitError::AlreadyInstalled,
                other => MetricsInitError::Install(other.to_string()),
            }
        }
    }

    #[inline]
    pub fn record_tick(duration: Duration, series: u64) {
        ::metrics::counter!(TICKS).increment(1);
        ::metrics::histogram!(TICK_DURATION_SECONDS).record(duration.as_secs_f64());
        if series > 0 {
            ::metrics::counter!(SERIES_GENERATED).increment(series);
        }
    }

    #[inline]
    pub fn record_write_request(duration: Duration, success: bool) {
        let status = if success { STATUS_SUCCESS } else { STATUS_FAILURE };
        ::metrics::counter!(WRITE_REQUESTS, STATUS_LABEL => status).increment(1);
        ::metrics::histogram!(WRITE_REQUEST_DURATION_SECONDS, STATUS_LABEL => status)
            .record(duration.as_secs_f64());
    }

    fn describe_all() {
        // Counters
        describe_counter!(TICKS, Unit::Count, "Total number of ticks run by the load writer.");
        describe_counter!(
            SERIES_GENERATED,
            Unit::Count,
            "Total number of series generated across all ticks."
        );
        describe_counter!(
            WRITE_REQUESTS,
            Unit::Count,
            "Total number of batch writes handed to the sink, by status."
        );

        // Histograms
        describe_histogram!(
            WRITE_REQUEST_DURATION_SECONDS,
            Unit::Seconds,
            "Time spent writing one batch to the sink."
        );
        describe_histogram!(
            TICK_DURATION_SECONDS,
            Unit::Seconds,
            "Time to generate and write all batches of one tick."
        );
    }
}

//! Tick-driven load writer: background thread that aligns, generates, batches and writes.

use crate::batch::batches;
use crate::config::WriterConfig;
use crate::error::{SinkError, WavegenError};
use crate::generator::generate;
use crate::sink::SeriesSink;
use crate::telemetry::{wavegen_metrics, WavegenEvent, WavegenEventListener};
use crate::time::{align, next_tick_after, now_millis};
use crate::types::{TimeSeries, Timestamp};

use rayon::prelude::*;
use rayon::ThreadPool;

use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Commands sent to the background writer thread.
enum WriterCommand {
    Tick {
        ack: mpsc::Sender<TickReport>,
    },
    Shutdown,
}

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Aligned tick timestamp (epoch milliseconds) every sample carries.
    pub timestamp: Timestamp,
    pub series: usize,
    pub batches: usize,
    pub failed_batches: usize,
    pub duration: Duration,
}

/// Periodically generates the configured series set and writes it through a [`SeriesSink`].
///
/// Ticks land on the `interval` grid (see [`crate::time::align`]). All batches of a tick are
/// attempted; a failing batch is reported and counted but does not cancel its siblings or
/// stop the writer.
#[derive(Debug)]
pub struct LoadWriter {
    cmd_tx: mpsc::Sender<WriterCommand>,
    handle: Option<JoinHandle<()>>,
    config: WriterConfig,
    events: Arc<dyn WavegenEventListener>,
}

impl LoadWriter {
    /// Validates `config`, builds a pool of `parallelism` threads and starts the tick loop.
    ///
    /// # Errors
    /// Returns a configuration error for invalid settings, or an error if the pool or the
    /// background thread cannot be created.
    pub fn start(
        config: WriterConfig,
        sink: Arc<dyn SeriesSink>,
        events: Arc<dyn WavegenEventListener>,
    ) -> Result<Self, WavegenError> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallelism)
            .thread_name(|i| format!("wavegen-batch-{}", i))
            .build()
            .map_err(|e| WavegenError::BackgroundTaskError(format!("Failed to build writer pool: {}", e)))?;

        let (cmd_tx, cmd_rx) = mpsc::channel::<WriterCommand>();
        let config_clone = config.clone();
        let events_clone = events.clone();

        let handle = thread::Builder::new()
            .name("wavegen-writer".to_string())
            .spawn(move || run_loop(cmd_rx, config_clone, sink, pool, events_clone))?;

        Ok(LoadWriter {
            cmd_tx,
            handle: Some(handle),
            config,
            events,
        })
    }

    /// Runs one tick immediately at the current aligned time and waits for its report.
    pub fn tick_now(&self) -> Result<TickReport, WavegenError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(WriterCommand::Tick { ack: tx })
            .map_err(|e| WavegenError::BackgroundTaskError(format!("Failed to send tick command: {}", e)))?;
        rx.recv()
            .map_err(|e| WavegenError::BackgroundTaskError(format!("Failed to receive tick report: {}", e)))
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Stops the tick loop and waits for the background thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // The thread may already be gone if it panicked.
        let _ = self.cmd_tx.send(WriterCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                self.events.on_event(WavegenEvent::WriterPanicked);
            }
        }
    }
}

impl Drop for LoadWriter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    cmd_rx: mpsc::Receiver<WriterCommand>,
    config: WriterConfig,
    sink: Arc<dyn SeriesSink>,
    pool: ThreadPool,
    events: Arc<dyn WavegenEventListener>,
) {
    events.on_event(WavegenEvent::WriterStarted);

    let mut last_tick: Option<Timestamp> = None;
    loop {
        let now = now_millis();
        // A timeout can fire a hair before the wall clock reaches the boundary; never repeat a tick.
        let from = last_tick.map_or(now, |last| last.max(now));
        let next = next_tick_after(from, config.interval);
        let wait = Duration::from_millis(next.saturating_sub(now).max(0) as u64);

        match cmd_rx.recv_timeout(wait) {
            Err(mpsc::RecvTimeoutError::Timeout) => {
                run_tick(next, &config, sink.as_ref(), &pool, events.as_ref());
                last_tick = Some(next);
            }
            Ok(WriterCommand::Tick { ack }) => {
                let t = align(now_millis(), config.interval);
                let report = run_tick(t, &config, sink.as_ref(), &pool, events.as_ref());
                let _ = ack.send(report);
            }
            Ok(WriterCommand::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                events.on_event(WavegenEvent::WriterStopping);
                break;
            }
        }
    }
}

/// Generates the series for `t` and writes every batch on `pool`.
pub(crate) fn run_tick(
    t: Timestamp,
    config: &WriterConfig,
    sink: &dyn SeriesSink,
    pool: &ThreadPool,
    events: &dyn WavegenEventListener,
) -> TickReport {
    let started = Instant::now();
    let series = generate(t, &config.generation);
    let batch_list: Vec<&[TimeSeries]> = batches(&series, config.batch_size).collect();

    let failures: Vec<(usize, SinkError)> = pool.install(|| {
        batch_list
            .par_iter()
            .enumerate()
            .filter_map(|(idx, batch)| {
                let write_started = Instant::now();
                let res = sink.write(batch);
                wavegen_metrics::record_write_request(write_started.elapsed(), res.is_ok());
                res.err().map(|e| (idx, e))
            })
            .collect()
    });

    for (batch_index, error) in &failures {
        events.on_event(WavegenEvent::BatchWriteFailed {
            timestamp: t,
            batch_index: *batch_index,
            error: error.to_string(),
        });
    }

    let duration = started.elapsed();
    wavegen_metrics::record_tick(duration, series.len() as u64);

    let report = TickReport {
        timestamp: t,
        series: series.len(),
        batches: batch_list.len(),
        failed_batches: failures.len(),
        duration,
    };
    events.on_event(WavegenEvent::TickCompleted {
        timestamp: report.timestamp,
        series: report.series,
        batches: report.batches,
        failed_batches: report.failed_batches,
        duration: report.duration,
    });
    report
}

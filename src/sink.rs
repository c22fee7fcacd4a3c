//! Destinations for generated batches.
//!
//! A sink is the seam where a transport (for example a remote-write client) plugs in. The crate
//! ships in-process sinks only: one that discards data while counting it, and one that encodes
//! series as JSON lines.

use crate::error::SinkError;
use crate::types::TimeSeries;

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Receives batches of generated series. Called concurrently from the writer's pool.
pub trait SeriesSink: fmt::Debug + Send + Sync + 'static {
    fn write(&self, batch: &[TimeSeries]) -> Result<(), SinkError>;
}

/// Accepts every batch and keeps only counts.
#[derive(Debug, Default)]
pub struct DiscardSink {
    series: AtomicU64,
    batches: AtomicU64,
}

impl DiscardSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total series accepted so far.
    pub fn series_written(&self) -> u64 {
        self.series.load(Ordering::Relaxed)
    }

    /// Total batches accepted so far.
    pub fn batches_written(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }
}

impl SeriesSink for DiscardSink {
    #[inline]
    fn write(&self, batch: &[TimeSeries]) -> Result<(), SinkError> {
        self.series.fetch_add(batch.len() as u64, Ordering::Relaxed);
        self.batches.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Writes each series as one JSON object per line.
///
/// Batches are written under a lock so lines from concurrent batches never interleave; the
/// writer is flushed after every batch.
pub struct JsonLinesSink<W: Write + Send + 'static> {
    out: Mutex<W>,
}

impl<W: Write + Send + 'static> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        JsonLinesSink {
            out: Mutex::new(out),
        }
    }

    /// Consumes the sink and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        Ok(self.out.into_inner()?)
    }
}

impl JsonLinesSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

impl<W: Write + Send + 'static> SeriesSink for JsonLinesSink<W> {
    fn write(&self, batch: &[TimeSeries]) -> Result<(), SinkError> {
        let mut out = self.out.lock()?;
        for series in batch {
            serde_json::to_writer(&mut *out, series)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

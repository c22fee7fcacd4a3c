//! Load-generator daemon for wavegen.
//!
//! Loads configuration from (in precedence order): defaults, config file, environment variables
//! (`WAVEGEN_*`), and CLI flags. Starts the tick-driven writer, serves health/readiness/metrics
//! endpoints, and runs until graceful shutdown (SIGINT/SIGTERM).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use clap::{Parser, ValueEnum};
use config::{Config, Environment, File};
use http_body_util::Full;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::graceful::GracefulShutdown;
use wavegen::telemetry::wavegen_metrics::InProcessPrometheus;
use wavegen::{
    DiscardSink, GenerationConfig, JsonLinesSink, LoadWriter, SeriesSink, WavegenEvent,
    WavegenEventListener, WriterConfig,
};

// ---------- CLI ----------

/// Where generated batches go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Count and drop every batch.
    Discard,
    /// Print every series as one JSON line on stdout.
    Stdout,
}

impl SinkKind {
    fn as_str(self) -> &'static str {
        match self {
            SinkKind::Discard => "discard",
            SinkKind::Stdout => "stdout",
        }
    }
}

/// wavegen sine-wave load generator daemon.
#[derive(Parser, Debug)]
#[command(name = "wavegend", version, about)]
pub struct Cli {
    /// Path to config file (TOML). If omitted, no file is loaded unless default path exists.
    #[arg(long, env = "WAVEGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not load any config file; use defaults + env + CLI only.
    #[arg(long, default_value_t = false)]
    pub no_config: bool,

    /// Load and validate config (file + env + CLI), print the effective settings, then exit.
    #[arg(long, default_value_t = false)]
    pub validate_config: bool,

    /// HTTP listen address for health/readiness/metrics endpoints (e.g. 127.0.0.1:9090).
    #[arg(long, env = "WAVEGEN_HTTP_BIND")]
    pub http_bind: Option<String>,

    /// Number of series ranks generated per tick.
    #[arg(long)]
    pub num_series: Option<usize>,

    /// Number of metadata labels attached to every series.
    #[arg(long)]
    pub extra_labels: Option<usize>,

    /// Churn period in seconds (0 disables churn).
    #[arg(long)]
    pub churn_period_secs: Option<u64>,

    /// Prefix for churn and metadata label names.
    #[arg(long)]
    pub label_prefix: Option<String>,

    /// Tick interval in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Maximum series per batch.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Maximum concurrent batch writes per tick.
    #[arg(long)]
    pub parallelism: Option<usize>,

    /// Destination of generated batches.
    #[arg(long, value_enum)]
    pub sink: Option<SinkKind>,
}

// ---------- File/env config (all optional for partial config) ----------

/// Generation section in config file.
#[derive(Debug, Default, serde::Deserialize)]
pub struct GenerationFileConfig {
    pub num_series: Option<usize>,
    pub num_extra_labels: Option<usize>,
    pub churn_period_secs: Option<u64>,
    pub label_prefix: Option<String>,
}

/// Top-level daemon config as read from file + env. Every field optional for layering.
#[derive(Debug, Default, serde::Deserialize)]
pub struct DaemonFileConfig {
    /// HTTP listen address for /healthz, /readyz and /metrics (e.g. "127.0.0.1:9090").
    pub http_bind: Option<String>,
    pub interval_ms: Option<u64>,
    pub batch_size: Option<usize>,
    pub parallelism: Option<usize>,
    pub sink: Option<SinkKind>,
    pub generation: Option<GenerationFileConfig>,
}

/// Runtime options for the daemon derived from config + env + CLI.
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    /// Address to bind the HTTP health/readiness/metrics server.
    pub http_bind: SocketAddr,
    pub sink: SinkKind,
}

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:9090";

/// Parse `http_bind` string to `SocketAddr`. Returns error message on failure.
fn parse_http_bind(s: &str) -> Result<SocketAddr, String> {
    s.parse::<SocketAddr>()
        .map_err(|e| format!("invalid http_bind {:?}: {}", s, e))
}

/// Load merged config and daemon options. CLI overrides file/env for both.
fn load_daemon_config(cli: &Cli) -> Result<(WriterConfig, DaemonOptions), String> {
    let mut builder = Config::builder();

    if !cli.no_config {
        if let Some(ref path) = cli.config {
            if !path.exists() {
                return Err(format!("config file not found: {}", path.display()));
            }
            builder = builder.add_source(File::from(path.as_path()).required(false));
        } else {
            let default_path = PathBuf::from("wavegend.toml");
            if default_path.exists() {
                builder = builder.add_source(File::from(default_path.as_path()).required(false));
            }
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("WAVEGEN")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .ignore_empty(true),
    );

    let merged = builder.build().map_err(|e| e.to_string())?;
    let partial: DaemonFileConfig = merged.try_deserialize().map_err(|e| e.to_string())?;

    let mut writer_config = WriterConfig::default();
    merge_into_writer_config(&mut writer_config, &partial);
    merge_cli_into_writer_config(&mut writer_config, cli);
    writer_config.validate().map_err(|e| e.to_string())?;

    let http_bind_str = cli
        .http_bind
        .as_deref()
        .or(partial.http_bind.as_deref())
        .unwrap_or(DEFAULT_HTTP_BIND);
    let http_bind = parse_http_bind(http_bind_str)?;
    let sink = cli.sink.or(partial.sink).unwrap_or(SinkKind::Discard);

    Ok((writer_config, DaemonOptions { http_bind, sink }))
}

/// Merge file/env partial config onto `WriterConfig`. Only overwrites fields that are `Some`.
fn merge_into_writer_config(base: &mut WriterConfig, partial: &DaemonFileConfig) {
    if let Some(ms) = partial.interval_ms {
        base.interval = Duration::from_millis(ms);
    }
    if let Some(n) = partial.batch_size {
        base.batch_size = n;
    }
    if let Some(n) = partial.parallelism {
        base.parallelism = n;
    }
    if let Some(g) = &partial.generation {
        merge_generation(
            &mut base.generation,
            g.num_series,
            g.num_extra_labels,
            g.churn_period_secs,
            g.label_prefix.as_deref(),
        );
    }
}

fn merge_cli_into_writer_config(base: &mut WriterConfig, cli: &Cli) {
    if let Some(ms) = cli.interval_ms {
        base.interval = Duration::from_millis(ms);
    }
    if let Some(n) = cli.batch_size {
        base.batch_size = n;
    }
    if let Some(n) = cli.parallelism {
        base.parallelism = n;
    }
    merge_generation(
        &mut base.generation,
        cli.num_series,
        cli.extra_labels,
        cli.churn_period_secs,
        cli.label_prefix.as_deref(),
    );
}

fn merge_generation(
    base: &mut GenerationConfig,
    num_series: Option<usize>,
    num_extra_labels: Option<usize>,
    churn_period_secs: Option<u64>,
    label_prefix: Option<&str>,
) {
    if let Some(n) = num_series {
        base.num_series = n;
    }
    if let Some(n) = num_extra_labels {
        base.num_extra_labels = n;
    }
    if let Some(secs) = churn_period_secs {
        base.churn_period = Duration::from_secs(secs);
    }
    if let Some(p) = label_prefix {
        base.label_prefix = p.to_string();
    }
}

// ---------- Event logging ----------

/// Forwards writer events to stderr as `key=value` lines.
#[derive(Debug)]
struct StderrEventListener;

impl WavegenEventListener for StderrEventListener {
    fn on_event(&self, event: WavegenEvent) {
        match event {
            WavegenEvent::WriterStarted => eprintln!("event=writer_started"),
            WavegenEvent::WriterStopping => eprintln!("event=writer_stopping"),
            WavegenEvent::WriterPanicked => eprintln!("event=writer_panicked"),
            WavegenEvent::TickCompleted {
                timestamp,
                series,
                batches,
                failed_batches,
                duration,
            } => eprintln!(
                "event=tick_completed timestamp={} series={} batches={} failed_batches={} duration_ms={}",
                timestamp,
                series,
                batches,
                failed_batches,
                duration.as_millis()
            ),
            WavegenEvent::BatchWriteFailed {
                timestamp,
                batch_index,
                error,
            } => eprintln!(
                "event=batch_write_failed timestamp={} batch_index={} error={:?}",
                timestamp, batch_index, error
            ),
        }
    }
}

// ---------- Health/metrics HTTP server ----------

/// Shared state for the HTTP service.
struct HttpState {
    ready: Arc<AtomicBool>,
    metrics: Arc<InProcessPrometheus>,
}

async fn http_service(
    state: Arc<HttpState>,
    req: Request<hyper::body::Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (status, body) = match (req.method(), req.uri().path()) {
        (&hyper::Method::GET, "/healthz") => {
            // Liveness: process is alive and responding.
            (hyper::StatusCode::OK, Bytes::from("ok"))
        }
        (&hyper::Method::GET, "/readyz") => {
            // Readiness: writer is running.
            if state.ready.load(Ordering::Acquire) {
                (hyper::StatusCode::OK, Bytes::from("ok"))
            } else {
                (
                    hyper::StatusCode::SERVICE_UNAVAILABLE,
                    Bytes::from("not ready"),
                )
            }
        }
        (&hyper::Method::GET, "/metrics") => {
            (hyper::StatusCode::OK, Bytes::from(state.metrics.render()))
        }
        _ => (hyper::StatusCode::NOT_FOUND, Bytes::from("not found")),
    };
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    Ok(response)
}

/// Returns a future that completes when SIGINT (Ctrl+C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("ctrl_c handler: {}", e);
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                eprintln!("SIGTERM handler: {}", e);
                ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    ctrl_c.await;
}

/// Runs the daemon: spawns the HTTP server, waits for shutdown signal, then stops the writer.
async fn run_with_http_server(
    writer: LoadWriter,
    options: DaemonOptions,
    state: Arc<HttpState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(options.http_bind)
        .await
        .map_err(|e| format!("failed to bind {}: {}", options.http_bind, e))?;
    eprintln!(
        "wavegend running (num_series={}, interval_ms={}, sink={}, http={}). Press Ctrl+C or send SIGTERM to stop.",
        writer.config().generation.num_series,
        writer.config().interval.as_millis(),
        options.sink.as_str(),
        options.http_bind
    );

    let server = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut shutdown = std::pin::pin!(shutdown_signal());

    loop {
        tokio::select! {
            Ok((stream, _addr)) = listener.accept() => {
                let io = TokioIo::new(Box::pin(stream));
                let state = Arc::clone(&state);
                let conn = server.serve_connection_with_upgrades(io, service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { http_service(state, req).await }
                }));
                let fut = graceful.watch(conn.into_owned());
                tokio::spawn(async move {
                    if let Err(e) = fut.await {
                        eprintln!("http connection error: {:?}", e);
                    }
                });
            }
            _ = &mut shutdown => {
                eprintln!("shutdown signal received");
                break;
            }
        }
    }

    state.ready.store(false, Ordering::Release);
    drop(listener);
    const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
    tokio::select! {
        _ = graceful.shutdown() => {
            eprintln!("all http connections closed");
        }
        _ = tokio::time::sleep(SHUTDOWN_TIMEOUT) => {
            eprintln!("shutdown timeout waiting for connections");
        }
    }

    eprintln!("stopping writer...");
    writer.shutdown();
    eprintln!("shutdown complete");
    Ok(())
}

// ---------- Main ----------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let (writer_config, options) = load_daemon_config(&cli).map_err(|e| {
        eprintln!("config error: {}", e);
        e
    })?;

    if cli.validate_config {
        let g = &writer_config.generation;
        println!("num_series={}", g.num_series);
        println!("num_extra_labels={}", g.num_extra_labels);
        println!("churn_period_secs={}", g.churn_period.as_secs());
        println!("label_prefix={}", g.label_prefix);
        println!("interval_ms={}", writer_config.interval.as_millis());
        println!("batch_size={}", writer_config.batch_size);
        println!("parallelism={}", writer_config.parallelism);
        println!("sink={}", options.sink.as_str());
        println!("http_bind={}", options.http_bind);
        return Ok(());
    }

    let metrics = InProcessPrometheus::install(Duration::from_secs(5)).map_err(|e| {
        eprintln!("metrics init failed: {}", e);
        e
    })?;

    let sink: Arc<dyn SeriesSink> = match options.sink {
        SinkKind::Discard => Arc::new(DiscardSink::new()),
        SinkKind::Stdout => Arc::new(JsonLinesSink::stdout()),
    };

    let writer = LoadWriter::start(writer_config, sink, Arc::new(StderrEventListener)).map_err(|e| {
        eprintln!("failed to start writer: {}", e);
        e
    })?;

    let state = Arc::new(HttpState {
        ready: Arc::new(AtomicBool::new(true)),
        metrics: Arc::new(metrics),
    });
    run_with_http_server(writer, options, state).await
}

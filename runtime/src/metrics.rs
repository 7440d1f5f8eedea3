//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for:
//! - Event store appends, loads and concurrency conflicts
//! - Stream replays (events folded into state)
//! - Commands accepted or rejected by the application layer
//!
//! Recording is always on; the values go nowhere until a recorder is
//! installed with [`MetricsServer::start`].
//!
//! # Example
//!
//! ```rust,no_run
//! use fictionary_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! if let Some(text) = server.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics recorder and renderer.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address kept for reporting (e.g., `0.0.0.0:9090`); no listener is opened
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// The configured address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Describe all metrics and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. A recorder
    /// that is already installed is not an error: a warning is logged and the
    /// existing one keeps recording.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            },
            Err(BuildError::FailedToSetGlobalRecorder(_)) => {
                tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                Ok(())
            },
            Err(e) => Err(MetricsError::Install(e.to_string())),
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Event Store Metrics
    describe_counter!(
        "event_store_events_appended_total",
        "Total number of events appended to the event store"
    );
    describe_counter!(
        "event_store_events_loaded_total",
        "Total number of events loaded from the event store"
    );
    describe_counter!(
        "event_store_concurrency_conflicts_total",
        "Total number of appends rejected by the optimistic concurrency check"
    );
    describe_histogram!(
        "event_store_append_duration_seconds",
        "Time taken to append events"
    );
    describe_histogram!(
        "event_store_load_duration_seconds",
        "Time taken to load events"
    );

    // Replay Metrics
    describe_counter!(
        "aggregate_events_replayed_total",
        "Total number of events folded into aggregate state"
    );

    // Command Metrics
    describe_counter!(
        "commands_accepted_total",
        "Total number of commands that produced events"
    );
    describe_counter!(
        "commands_rejected_total",
        "Total number of commands rejected with a domain error"
    );
}

/// Event store metrics recorder.
pub struct EventStoreMetrics;

impl EventStoreMetrics {
    /// Record an event append operation.
    pub fn record_append(count: usize, duration: Duration) {
        counter!("event_store_events_appended_total").increment(count as u64);
        histogram!("event_store_append_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record an event load operation.
    pub fn record_load(count: usize, duration: Duration) {
        counter!("event_store_events_loaded_total").increment(count as u64);
        histogram!("event_store_load_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record an append rejected because the stream moved on.
    pub fn record_conflict() {
        counter!("event_store_concurrency_conflicts_total").increment(1);
    }
}

/// Aggregate replay metrics recorder.
pub struct ReplayMetrics;

impl ReplayMetrics {
    /// Record events folded into state.
    pub fn record_replay(kind: &'static str, count: usize) {
        counter!("aggregate_events_replayed_total", "aggregate" => kind).increment(count as u64);
    }
}

/// Command outcome metrics recorder.
pub struct CommandMetrics;

impl CommandMetrics {
    /// Record a command that produced events.
    pub fn record_accepted(command: &'static str) {
        counter!("commands_accepted_total", "command" => command).increment(1);
    }

    /// Record a command rejected with a domain error.
    pub fn record_rejected(command: &'static str) {
        counter!("commands_rejected_total", "command" => command).increment(1);
    }
}

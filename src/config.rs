//! Command-line configuration.
//!
//! One required positional argument: the collector endpoint. The endpoint is
//! taken verbatim; a value no exporter can use surfaces later as an
//! initialization error, not here.

use clap::Parser;

/// OTLP/HTTP path for the trace signal.
pub const TRACES_PATH: &str = "/v1/traces";
/// OTLP/HTTP path for the metric signal.
pub const METRICS_PATH: &str = "/v1/metrics";
/// OTLP/HTTP path for the log signal.
pub const LOGS_PATH: &str = "/v1/logs";

/// Emits a correlated span, counter increment, and log record to an OTLP
/// collector on a fixed interval.
#[derive(Parser, Debug, Clone)]
#[command(name = "dummy-otel-generator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Collector base endpoint, e.g. http://localhost:4318
    pub endpoint: String,
}

impl Cli {
    /// Parse configuration from CLI arguments, exiting with a usage message
    /// when the endpoint argument is missing.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the exporter URL for one signal path.
    ///
    /// The OTLP/HTTP exporters use a programmatic endpoint verbatim, so the
    /// per-signal path has to be appended here.
    #[must_use]
    pub fn signal_endpoint(&self, signal_path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!("{base}{signal_path}")
    }
}

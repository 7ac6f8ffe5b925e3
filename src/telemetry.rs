//! OpenTelemetry provider construction and lifecycle.
//!
//! Each of the three signals follows the same shape: an OTLP/HTTP exporter
//! bound to its signal endpoint, wrapped in the SDK's batching layer, tagged
//! with the shared [`Resource`]. Construction has no global side effects;
//! [`Telemetry::install_globals`] is the opt-in step for code that pulls its
//! tracer or meter from the global registry. The [`TelemetryGuard`] shuts the
//! providers down in reverse initialization order when dropped.

use std::time::Duration;

use opentelemetry::global;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{
    ExporterBuildError, LogExporter, MetricExporter, Protocol, SpanExporter, WithExportConfig,
};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource as semconv;
use thiserror::Error;

use crate::config::{Cli, LOGS_PATH, METRICS_PATH, TRACES_PATH};

/// Service name carried by every emitted signal.
pub const SERVICE_NAME: &str = "dummy-otel-generator";
/// Service version carried by every emitted signal.
pub const SERVICE_VERSION: &str = "0.0.1";

/// Initialization failure of one of the three signals.
///
/// Any of these is fatal to the process; the variant names the signal that
/// could not be built.
#[derive(Debug, Error)]
pub enum InitError {
    /// Failed to create the trace exporter.
    #[error("failed to initialize tracer")]
    Tracer(#[source] ExporterBuildError),

    /// Failed to create the metric exporter.
    #[error("failed to initialize meter")]
    Meter(#[source] ExporterBuildError),

    /// Failed to create the log exporter.
    #[error("failed to initialize logger")]
    Logger(#[source] ExporterBuildError),
}

/// Tuning knobs for provider construction.
///
/// `Default` matches the production binary: SDK-default batching and export
/// intervals.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Export interval for the periodic metric reader. `None` keeps the SDK
    /// default.
    pub metric_export_interval: Option<Duration>,
}

/// Builds the resource shared by all three providers.
pub fn build_resource() -> Resource {
    Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attribute(KeyValue::new(semconv::SERVICE_VERSION, SERVICE_VERSION))
        .build()
}

/// Builds the OTLP/HTTP span exporter and its batching tracer provider.
///
/// `endpoint` is the full trace signal URL, e.g. `http://host:4318/v1/traces`.
pub fn init_traces(endpoint: &str, resource: Resource) -> Result<SdkTracerProvider, InitError> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .with_protocol(Protocol::HttpBinary)
        .build()
        .map_err(InitError::Tracer)?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

/// Builds the OTLP/HTTP metric exporter and its periodic-reader meter
/// provider.
pub fn init_metrics(
    endpoint: &str,
    resource: Resource,
    export_interval: Option<Duration>,
) -> Result<SdkMeterProvider, InitError> {
    let exporter = MetricExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .with_protocol(Protocol::HttpBinary)
        .build()
        .map_err(InitError::Meter)?;

    let builder = SdkMeterProvider::builder().with_resource(resource);
    let builder = match export_interval {
        Some(interval) => builder.with_reader(
            PeriodicReader::builder(exporter)
                .with_interval(interval)
                .build(),
        ),
        None => builder.with_periodic_exporter(exporter),
    };

    Ok(builder.build())
}

/// Builds the OTLP/HTTP log exporter and its batch-processed logger provider.
///
/// The returned provider is meant to back a `tracing` bridge layer; it is
/// never installed globally.
pub fn init_logs(endpoint: &str, resource: Resource) -> Result<SdkLoggerProvider, InitError> {
    let exporter = LogExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .with_protocol(Protocol::HttpBinary)
        .build()
        .map_err(InitError::Logger)?;

    Ok(SdkLoggerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

/// The three provider handles, plus the resource they share.
#[derive(Debug)]
pub struct Telemetry {
    pub tracer_provider: SdkTracerProvider,
    pub meter_provider: SdkMeterProvider,
    pub logger_provider: SdkLoggerProvider,
    pub resource: Resource,
}

impl Telemetry {
    /// Initializes the tracer, meter, and logger providers, in that order,
    /// against the endpoint from the CLI.
    pub fn init(cli: &Cli, config: &TelemetryConfig) -> Result<Self, InitError> {
        let resource = build_resource();

        let tracer_provider = init_traces(&cli.signal_endpoint(TRACES_PATH), resource.clone())?;
        let meter_provider = init_metrics(
            &cli.signal_endpoint(METRICS_PATH),
            resource.clone(),
            config.metric_export_interval,
        )?;
        let logger_provider = init_logs(&cli.signal_endpoint(LOGS_PATH), resource.clone())?;

        Ok(Self {
            tracer_provider,
            meter_provider,
            logger_provider,
            resource,
        })
    }

    /// Registers the tracer provider, meter provider, and the composite
    /// trace-context + baggage propagator process-wide.
    ///
    /// The logger provider stays local: it is handed to the subscriber's
    /// bridge layer instead.
    pub fn install_globals(&self) {
        global::set_tracer_provider(self.tracer_provider.clone());
        global::set_meter_provider(self.meter_provider.clone());
        global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
            Box::new(TraceContextPropagator::new()),
            Box::new(BaggagePropagator::new()),
        ]));
    }

    /// Converts the bundle into a guard that shuts the providers down when
    /// dropped.
    pub fn into_guard(self) -> TelemetryGuard {
        TelemetryGuard {
            tracer_provider: Some(self.tracer_provider),
            meter_provider: Some(self.meter_provider),
            logger_provider: Some(self.logger_provider),
        }
    }
}

/// Shuts the providers down, flushing buffered telemetry, when dropped.
///
/// Shutdown runs in reverse initialization order (logger, meter, tracer),
/// exactly once, on every exit path including panics. Failures are logged,
/// never propagated.
#[derive(Debug)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.logger_provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::error!(error = %e, "failed to shut down logger provider");
            }
        }

        if let Some(provider) = self.meter_provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::error!(error = %e, "failed to shut down meter provider");
            }
        }

        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                tracing::error!(error = %e, "failed to shut down tracer provider");
            }
        }
    }
}

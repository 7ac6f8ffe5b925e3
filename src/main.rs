use anyhow::Result;
use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use dummy_otel_generator::config::Cli;
use dummy_otel_generator::emitter::{Emitter, EmitterConfig, COUNTER_NAME, SCOPE_NAME};
use dummy_otel_generator::telemetry::{Telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let telemetry = Telemetry::init(&cli, &TelemetryConfig::default())?;

    // Events from the OTLP exporters' own HTTP stack must not reach the
    // bridge layer, or every export would generate more telemetry to export.
    let filter_otel = EnvFilter::new("info")
        .add_directive("hyper=off".parse().unwrap())
        .add_directive("opentelemetry=off".parse().unwrap())
        .add_directive("tonic=off".parse().unwrap())
        .add_directive("h2=off".parse().unwrap())
        .add_directive("reqwest=off".parse().unwrap());
    let otel_layer =
        OpenTelemetryTracingBridge::new(&telemetry.logger_provider).with_filter(filter_otel);

    let filter_fmt = EnvFilter::new("info").add_directive("opentelemetry=debug".parse().unwrap());
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_names(true)
        .with_filter(filter_fmt);

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt_layer)
        .init();

    telemetry.install_globals();

    let tracer = telemetry.tracer_provider.tracer(SCOPE_NAME);
    let counter = telemetry
        .meter_provider
        .meter(SCOPE_NAME)
        .u64_counter(COUNTER_NAME)
        .build();
    let guard = telemetry.into_guard();

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let emitter = Emitter::new(tracer, counter, EmitterConfig::default());
    let ticks = emitter.run(token).await;

    info!(ticks, "shutting down");
    drop(guard);

    Ok(())
}

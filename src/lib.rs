//! A minimal OTLP signal generator.
//!
//! Every 30 seconds the program opens a span named `IncrementCounter`,
//! increments `my_custom_counter` inside it, and writes a `Counter
//! incremented` log record correlated to that span, exporting all three
//! signals over OTLP/HTTP to the collector endpoint given on the command
//! line.

pub mod config;
pub mod emitter;
pub mod telemetry;

pub use config::Cli;
pub use emitter::{Emitter, EmitterConfig};
pub use telemetry::{InitError, Telemetry, TelemetryConfig, TelemetryGuard};

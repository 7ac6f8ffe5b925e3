//! The periodic emission loop.

use std::time::Duration;

use opentelemetry::metrics::Counter;
use opentelemetry::trace::Tracer;
use opentelemetry_sdk::trace::SdkTracer;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Instrumentation scope the tracer and meter are created from.
pub const SCOPE_NAME: &str = "dummy-otel-app";
/// Name of the span opened on every tick.
pub const SPAN_NAME: &str = "IncrementCounter";
/// Name of the counter incremented once per tick.
pub const COUNTER_NAME: &str = "my_custom_counter";

/// Emission timing. `Default` is the production 30-second interval.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Time between ticks.
    pub interval: Duration,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

/// Emits one span, one counter increment, and one correlated log record per
/// tick.
///
/// The tracer and counter are injected, so the loop works against any
/// provider a caller hands it. The first tick fires one full interval after
/// [`run`](Emitter::run) is entered; nothing is emitted at startup.
#[derive(Debug)]
pub struct Emitter {
    tracer: SdkTracer,
    counter: Counter<u64>,
    config: EmitterConfig,
}

impl Emitter {
    pub fn new(tracer: SdkTracer, counter: Counter<u64>, config: EmitterConfig) -> Self {
        Self {
            tracer,
            counter,
            config,
        }
    }

    /// Runs the loop until the token is cancelled, returning the number of
    /// completed ticks.
    pub async fn run(self, token: CancellationToken) -> u64 {
        let mut interval = time::interval_at(
            Instant::now() + self.config.interval,
            self.config.interval,
        );
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                // Cancellation wins over a tick that became due at the same
                // moment.
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    self.emit_once();
                    ticks += 1;
                }
            }
        }

        ticks
    }

    /// One tick: open the span, increment the counter inside it, and write
    /// the log record while the span is current so the bridge picks up its
    /// trace context. The same event also reaches the console layer, without
    /// correlation.
    fn emit_once(&self) {
        self.tracer.in_span(SPAN_NAME, |_cx| {
            self.counter.add(1, &[]);
            info!("Counter incremented");
        });
    }
}
